//! ConfirmPayment command handler
//!
//! Settles a pending bill. Confirmation is idempotent: a bill that is
//! already paid is returned unchanged, so a double tap at the till cannot
//! re-stamp the issue time.

use tracing::info;

use shared::models::{Bill, PaymentMethod, PaymentStatus};
use shared::order::{Notification, OrderStatus};

use crate::orders::error::OrderError;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};

use super::free_table_if_held;

/// ConfirmPayment action
#[derive(Debug, Clone)]
pub struct ConfirmPaymentAction {
    pub bill_id: String,
    pub method: PaymentMethod,
}

impl CommandHandler for ConfirmPaymentAction {
    type Output = Bill;

    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Bill, OrderError> {
        // 1. Load the bill
        let mut bill = ctx.load_bill(&self.bill_id)?;

        // 2. Re-confirmation is a no-op
        if bill.payment_status == PaymentStatus::Paid {
            return Ok(bill);
        }

        // 3. Settle with the method actually used at the till
        bill.payment_method = self.method;
        bill.payment_status = PaymentStatus::Paid;
        bill.issued_at = metadata.timestamp;

        // 4. Repair the linked order if billing somehow left it unsettled
        let mut order = ctx.load_order(&bill.order_id)?;
        if order.status != OrderStatus::Paid {
            order.status = OrderStatus::Paid;
            order.updated_at = metadata.timestamp;
            free_table_if_held(ctx, order.table_id, &order.order_id)?;
            ctx.save_order(order.clone());
            ctx.notify(Notification::OrderUpdated { order });
        }

        ctx.save_bill(bill.clone());

        info!(bill_id = %self.bill_id, method = ?self.method, "Payment confirmed");
        Ok(bill)
    }
}
