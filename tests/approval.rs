#![allow(non_snake_case)]

use double_or_nothing::{
    ContractEvent,
    EventSource,
    FlipPhase,
    flip::FlipError,
    options::{
        REQUIRED_ALLOWANCE,
        chip_asset_id,
    },
    test_helpers::TestContext,
};
use fuels::types::Address;

#[tokio::test]
async fn native_token__is_always_approved() {
    let ctx = TestContext::native();
    let mut controller = ctx.controller();
    assert!(controller.approved());

    // no allowance exists anywhere, the flag must not flip
    controller.refresh_approval().await.unwrap();

    assert!(controller.approved());
    assert_eq!(controller.phase(), FlipPhase::Choosing { ready: false });
}

#[tokio::test]
async fn allowance_below_threshold__requires_approval() {
    let ctx = TestContext::with_token(chip_asset_id());
    ctx.set_allowance(ctx.account, 10);
    let mut controller = ctx.controller();

    controller.refresh_approval().await.unwrap();

    assert!(!controller.approved());
    assert_eq!(controller.phase(), FlipPhase::NeedsApproval);
}

#[tokio::test]
async fn allowance_above_threshold__is_approved() {
    let ctx = TestContext::with_token(chip_asset_id());
    ctx.set_allowance(ctx.account, REQUIRED_ALLOWANCE + 1);
    let mut controller = ctx.controller();

    controller.refresh_approval().await.unwrap();

    assert!(controller.approved());
}

#[tokio::test]
async fn allowance_equal_to_threshold__is_not_enough() {
    let ctx = TestContext::with_token(chip_asset_id());
    ctx.set_allowance(ctx.account, REQUIRED_ALLOWANCE);
    let mut controller = ctx.controller();

    controller.refresh_approval().await.unwrap();

    assert!(!controller.approved());
}

#[tokio::test]
async fn start_game__is_blocked_until_approved() {
    let ctx = TestContext::with_token(chip_asset_id());
    let mut controller = ctx.controller();
    controller.refresh_approval().await.unwrap();
    controller.select_side(0);
    controller.select_stake(0);

    let result = controller.start_game().await;

    assert_eq!(result, Err(FlipError::NotApproved));
    assert!(ctx.submissions().is_empty());
}

#[tokio::test]
async fn approval_event__refreshes_the_allowance() {
    let mut ctx = TestContext::with_token(chip_asset_id());
    let mut events = ctx.events();
    let mut controller = ctx.controller();
    controller.refresh_approval().await.unwrap();
    assert!(!controller.approved());

    // when: the allowance lands on chain and the notification arrives
    ctx.set_allowance(ctx.account, REQUIRED_ALLOWANCE + 1);
    ctx.send_approval(ctx.account, REQUIRED_ALLOWANCE + 1).await;
    let event = events.next_event().await.unwrap();
    controller.handle_event(event).await.unwrap();

    assert!(controller.approved());
}

#[tokio::test]
async fn approval_event__for_another_owner_is_ignored() {
    let ctx = TestContext::with_token(chip_asset_id());
    let mut controller = ctx.controller();
    controller.refresh_approval().await.unwrap();

    // the allowance exists, but the notification names someone else
    ctx.set_allowance(ctx.account, REQUIRED_ALLOWANCE + 1);
    let stranger = Address::new([7u8; 32]);
    controller
        .handle_event(ContractEvent::approval(
            stranger,
            Address::new([9u8; 32]),
            REQUIRED_ALLOWANCE + 1,
        ))
        .await
        .unwrap();

    assert!(!controller.approved());
}

#[tokio::test]
async fn approve__grants_the_allowance_and_unblocks_the_game() {
    let ctx = TestContext::with_token(chip_asset_id());
    let mut controller = ctx.controller();
    controller.refresh_approval().await.unwrap();
    assert!(!controller.approved());

    controller.approve().await.unwrap();

    assert!(controller.approved());
    controller.select_side(0);
    controller.select_stake(0);
    controller.start_game().await.unwrap();
    assert_eq!(ctx.submissions().len(), 1);
}

#[tokio::test]
async fn approve__on_a_native_game_is_a_no_op() {
    let ctx = TestContext::native();
    let mut controller = ctx.controller();

    controller.approve().await.unwrap();

    assert!(controller.approved());
}
