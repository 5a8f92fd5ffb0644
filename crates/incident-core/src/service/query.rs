//! Read path: list with filter/sort/pagination, and get by id.

use super::{internal, require_caller, IncidentService};
use crate::domain::{
    parse_incident_id, CallerId, Incident, IncidentError, IncidentPage, IncidentQuery, ListParams,
    Pagination,
};
use tracing::debug;

impl IncidentService {
    /// Filtered, sorted page plus the total match count.
    ///
    /// The page fetch and the count run concurrently; they are not a
    /// snapshot, so a write landing between them can skew `total` by one.
    pub async fn list_incidents(
        &self,
        caller: Option<&CallerId>,
        params: &ListParams,
    ) -> Result<IncidentPage, IncidentError> {
        require_caller(caller)?;
        let query = IncidentQuery::parse(params)?;
        debug!(
            filter = ?query.filter,
            sort = %query.sort.field,
            direction = query.sort.direction.as_str(),
            page = query.page.page,
            limit = query.page.limit,
            "[incidents] list"
        );

        let (data, total) = tokio::try_join!(
            self.store.find_many(
                &query.filter,
                query.sort,
                query.page.offset(),
                query.page.limit
            ),
            self.store.count(&query.filter),
        )
        .map_err(internal("list"))?;

        Ok(IncidentPage {
            data,
            pagination: Pagination::new(query.page, total),
        })
    }

    pub async fn get_incident(
        &self,
        caller: Option<&CallerId>,
        id: &str,
    ) -> Result<Incident, IncidentError> {
        require_caller(caller)?;
        let id = parse_incident_id(id)?;
        self.store
            .find_by_id(id)
            .await
            .map_err(internal("get"))?
            .ok_or(IncidentError::NotFound)
    }
}
