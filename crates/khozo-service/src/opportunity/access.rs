//! Ownership check shared by every owner-only operation.

use uuid::Uuid;

use khozo_core::AppError;
use khozo_core::result::AppResult;
use khozo_database::store::OpportunityStore;
use khozo_entity::opportunity::Opportunity;

use crate::context::RequestContext;

/// Load an opportunity the acting user owns.
///
/// Fails with `NotFound` when absent and `Authorization` when someone else
/// owns it. Neither case mutates anything.
pub async fn load_owned(
    store: &dyn OpportunityStore,
    ctx: &RequestContext,
    opportunity_id: Uuid,
) -> AppResult<Opportunity> {
    let opportunity = store
        .find_by_id(opportunity_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Opportunity {opportunity_id} not found")))?;

    if !opportunity.is_owned_by(ctx.user_id) {
        return Err(AppError::unauthorized(
            "You do not have access to this opportunity",
        ));
    }
    Ok(opportunity)
}
