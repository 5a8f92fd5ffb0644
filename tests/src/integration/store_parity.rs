//! # Store Parity
//!
//! The in-memory and SQLite adapters must answer every list query the same
//! way, so that switching `store.backend` never changes API results.
//!
//! Where ordering ties are possible (enum and service sorts) only the sequence
//! of sort keys is compared, since tie order is unspecified.

#[cfg(test)]
mod tests {
    use super::super::fixture_incidents;
    use incident_core::test_utils::IncidentBuilder;
    use incident_core::{
        FilterSpec, InMemoryIncidentStore, Incident, IncidentQuery, IncidentStore,
        IncidentUpdate, ListParams, Severity, SortField, SqliteIncidentStore, Status,
    };
    use std::sync::Arc;
    use uuid::Uuid;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    async fn stores(incidents: Vec<Incident>) -> Vec<(&'static str, Arc<dyn IncidentStore>)> {
        let sqlite = SqliteIncidentStore::open_in_memory().unwrap();
        sqlite.create_many(incidents.clone()).await.unwrap();
        vec![
            (
                "memory",
                Arc::new(InMemoryIncidentStore::with_incidents(incidents)),
            ),
            ("sqlite", Arc::new(sqlite)),
        ]
    }

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let mut params = ListParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => params.page = value,
                "limit" => params.limit = value,
                "severity" => params.severity = value,
                "status" => params.status = value,
                "service" => params.service = value,
                "search" => params.search = value,
                "sortBy" => params.sort_by = value,
                "sortOrder" => params.sort_order = value,
                other => panic!("unknown parameter {other}"),
            }
        }
        params
    }

    async fn run(store: &dyn IncidentStore, query: &IncidentQuery) -> (Vec<Incident>, u64) {
        let rows = store
            .find_many(
                &query.filter,
                query.sort,
                query.page.offset(),
                query.page.limit,
            )
            .await
            .unwrap();
        let total = store.count(&query.filter).await.unwrap();
        (rows, total)
    }

    fn sort_keys(field: SortField, rows: &[Incident]) -> Vec<String> {
        rows.iter()
            .map(|i| match field {
                SortField::CreatedAt => i.created_at.to_rfc3339(),
                SortField::Severity => i.severity.to_string(),
                SortField::Status => i.status.to_string(),
                SortField::Service => i.service.clone(),
            })
            .collect()
    }

    // =============================================================================
    // LIST PARITY
    // =============================================================================

    #[tokio::test]
    async fn test_list_queries_agree() {
        let cases: Vec<Vec<(&str, &str)>> = vec![
            vec![],
            vec![("page", "2"), ("limit", "7")],
            vec![("severity", "SEV2")],
            vec![("status", "MITIGATED"), ("service", "API Gateway")],
            vec![("search", "connection")],
            vec![("search", "CHECKOUT"), ("limit", "100")],
            vec![("sortBy", "createdAt"), ("sortOrder", "asc"), ("limit", "5")],
            vec![("sortBy", "severity"), ("limit", "100")],
            vec![("sortBy", "status"), ("sortOrder", "desc"), ("limit", "100")],
            vec![("sortBy", "service"), ("limit", "100")],
            vec![("page", "9"), ("limit", "10")],
            vec![("service", "Nonexistent Service")],
        ];

        let stores = stores(fixture_incidents()).await;
        for case in cases {
            let query = IncidentQuery::parse(&params(&case)).unwrap();
            let (memory_rows, memory_total) = run(stores[0].1.as_ref(), &query).await;
            let (sqlite_rows, sqlite_total) = run(stores[1].1.as_ref(), &query).await;

            assert_eq!(memory_total, sqlite_total, "total differs for {case:?}");
            assert_eq!(
                sort_keys(query.sort.field, &memory_rows),
                sort_keys(query.sort.field, &sqlite_rows),
                "order differs for {case:?}"
            );
            if query.sort.field == SortField::CreatedAt {
                assert_eq!(memory_rows, sqlite_rows, "rows differ for {case:?}");
            }
        }
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case_identically() {
        let incidents = vec![
            IncidentBuilder::new().title("ÜBER cache eviction").build(),
            IncidentBuilder::new()
                .title("Quiet night")
                .summary(Some("Ärger mit dem Load Balancer"))
                .build(),
            IncidentBuilder::new().title("Unrelated").summary(None).build(),
        ];

        for (name, store) in stores(incidents).await {
            for (needle, expected) in [("über", 1), ("ärger", 1), ("LOAD balancer", 1), ("zzz", 0)] {
                let filter = FilterSpec {
                    search: Some(needle.to_string()),
                    ..Default::default()
                };
                assert_eq!(
                    store.count(&filter).await.unwrap(),
                    expected,
                    "{name}: search {needle:?}"
                );
            }
        }
    }

    #[tokio::test]
    async fn test_search_treats_sql_wildcards_literally() {
        let incidents = vec![
            IncidentBuilder::new().title("100% packet loss").build(),
            IncidentBuilder::new().title("1000 packets dropped").build(),
            IncidentBuilder::new().title("snake_case key rejected").build(),
            IncidentBuilder::new().title("snakeXcase").build(),
        ];

        for (name, store) in stores(incidents).await {
            for (needle, expected) in [("0%", 1), ("e_c", 1)] {
                let filter = FilterSpec {
                    search: Some(needle.to_string()),
                    ..Default::default()
                };
                assert_eq!(
                    store.count(&filter).await.unwrap(),
                    expected,
                    "{name}: search {needle:?}"
                );
            }
        }
    }

    // =============================================================================
    // MUTATION PARITY
    // =============================================================================

    #[tokio::test]
    async fn test_updates_agree() {
        let target = IncidentBuilder::new()
            .severity(Severity::Sev4)
            .summary(Some("initial"))
            .build();
        let id = target.id;

        for (name, store) in stores(vec![target.clone()]).await {
            let updated = store
                .update_by_id(
                    id,
                    &IncidentUpdate {
                        status: Some(Status::Resolved),
                        summary: Some(None),
                        ..Default::default()
                    },
                )
                .await
                .unwrap()
                .unwrap();

            let mut expected = target.clone();
            expected.status = Status::Resolved;
            expected.summary = None;
            assert_eq!(updated, expected, "{name}");
            assert_eq!(store.find_by_id(id).await.unwrap(), Some(expected), "{name}");

            let missing = store
                .update_by_id(
                    Uuid::new_v4(),
                    &IncidentUpdate {
                        severity: Some(Severity::Sev1),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            assert_eq!(missing, None, "{name}");
        }
    }

    #[tokio::test]
    async fn test_batch_with_repeated_id_is_rejected_whole() {
        let first = IncidentBuilder::new().title("first").build();
        let repeat = IncidentBuilder::new().id(first.id).title("second").build();
        let batch = vec![first, IncidentBuilder::new().build(), repeat];

        for (name, store) in stores(vec![]).await {
            assert!(store.create_many(batch.clone()).await.is_err(), "{name}");
            assert_eq!(store.count(&FilterSpec::default()).await.unwrap(), 0, "{name}");
        }
    }

    #[tokio::test]
    async fn test_far_offset_is_empty_in_both_stores() {
        let query = IncidentQuery::parse(&params(&[("page", "1e30"), ("limit", "100")])).unwrap();
        for (name, store) in stores(fixture_incidents()).await {
            let (rows, total) = run(store.as_ref(), &query).await;
            assert!(rows.is_empty(), "{name}");
            assert_eq!(total, 30, "{name}");
        }
    }

    #[tokio::test]
    async fn test_delete_all_reports_count() {
        for (name, store) in stores(fixture_incidents()).await {
            assert_eq!(store.delete_all().await.unwrap(), 30, "{name}");
            assert_eq!(store.count(&FilterSpec::default()).await.unwrap(), 0, "{name}");
        }
    }

    #[tokio::test]
    async fn test_closed_store_refuses_work() {
        for (name, store) in stores(vec![]).await {
            store.close().await.unwrap();
            assert!(
                store.count(&FilterSpec::default()).await.is_err(),
                "{name}"
            );
        }
    }
}
