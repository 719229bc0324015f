//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles one
//! lifecycle command.

mod add_item;
mod cancel_order;
mod close_order;
mod confirm_payment;
mod create_bill;
mod finish_playing;
mod modify_item;
mod open_table;
mod remove_item;
mod set_table_status;

use shared::models::TableStatus;
use shared::order::Notification;

use super::error::OrderError;
use super::traits::CommandContext;

pub use add_item::AddItemAction;
pub use cancel_order::CancelOrderAction;
pub use close_order::CloseOrderAction;
pub use confirm_payment::ConfirmPaymentAction;
pub use create_bill::CreateBillAction;
pub use finish_playing::FinishPlayingAction;
pub use modify_item::ModifyItemAction;
pub use open_table::OpenTableAction;
pub use remove_item::RemoveItemAction;
pub use set_table_status::SetTableStatusAction;

/// Free `table_id` if `order_id` is the active order holding it
///
/// Clears the occupancy link, flips the table to free and queues the
/// status notification. No-op when the table was already released.
pub(crate) fn free_table_if_held(
    ctx: &mut CommandContext<'_>,
    table_id: i64,
    order_id: &str,
) -> Result<(), OrderError> {
    if ctx.order_for_table(table_id)?.as_deref() != Some(order_id) {
        return Ok(());
    }
    let mut table = ctx.load_table(table_id)?;
    table.status = TableStatus::Free;
    ctx.save_table(table);
    ctx.release_table(table_id);
    ctx.notify(Notification::TableStatus {
        table_id,
        status: TableStatus::Free,
    });
    Ok(())
}
