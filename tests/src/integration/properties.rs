//! # Query Properties
//!
//! Property tests for the list path:
//!
//! - page arithmetic (`offset`, `totalPages`, window length)
//! - filter soundness and completeness against a brute-force scan
//! - result ordering follows the requested sort
//! - numeric parameter bounds

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use incident_core::test_utils::IncidentBuilder;
    use incident_core::{
        FilterSpec, InMemoryIncidentStore, Incident, IncidentQuery, IncidentStore, ListParams,
        PageSpec, Severity, SortDirection, SortField, SortSpec, Status, MAX_LIMIT,
    };
    use proptest::prelude::*;
    use std::cmp::Ordering;

    const SERVICES: [&str; 3] = ["Auth Service", "Billing Service", "Search Service"];
    const WORDS: [&str; 4] = ["timeout", "Timeout spike", "disk full", "TLS expiry"];

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    fn base_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn arb_incident() -> impl Strategy<Value = Incident> {
        (0..4usize, 0..3usize, 0..3usize, 0..4usize, 0..10_000i64).prop_map(
            |(sev, status, service, word, minutes)| {
                IncidentBuilder::new()
                    .severity(Severity::ALL[sev])
                    .status(Status::ALL[status])
                    .service(SERVICES[service])
                    .title(WORDS[word])
                    .summary((word % 2 == 0).then_some("Investigating"))
                    .created_at(base_time() + Duration::minutes(minutes))
                    .build()
            },
        )
    }

    fn arb_filter() -> impl Strategy<Value = FilterSpec> {
        (
            proptest::option::of(0..4usize),
            proptest::option::of(0..3usize),
            proptest::option::of(0..3usize),
            proptest::option::of(prop_oneof![
                Just("timeout"),
                Just("TIMEOUT"),
                Just("invest"),
                Just("tls")
            ]),
        )
            .prop_map(|(sev, status, service, search)| FilterSpec {
                severity: sev.map(|i| Severity::ALL[i]),
                status: status.map(|i| Status::ALL[i]),
                service: service.map(|i| SERVICES[i].to_string()),
                search: search.map(str::to_string),
            })
    }

    fn arb_sort() -> impl Strategy<Value = SortSpec> {
        (0..4usize, any::<bool>()).prop_map(|(field, asc)| SortSpec {
            field: SortField::ALL[field],
            direction: if asc {
                SortDirection::Asc
            } else {
                SortDirection::Desc
            },
        })
    }

    proptest! {
        #[test]
        fn prop_page_arithmetic(page in 1u64..1_000, limit in 1u32..=MAX_LIMIT, total in 0u64..100_000) {
            let spec = PageSpec { page, limit };
            prop_assert_eq!(spec.offset(), (page - 1) * u64::from(limit));

            let pages = spec.total_pages(total);
            prop_assert!(pages * u64::from(limit) >= total);
            if total > 0 {
                prop_assert!((pages - 1) * u64::from(limit) < total);
            } else {
                prop_assert_eq!(pages, 0);
            }
        }

        #[test]
        fn prop_window_length(
            incidents in proptest::collection::vec(arb_incident(), 0..60),
            page in 1u64..10,
            limit in 1u32..=20,
        ) {
            let total = incidents.len() as u64;
            let store = InMemoryIncidentStore::with_incidents(incidents);
            let spec = PageSpec { page, limit };
            let rows = block_on(store.find_many(
                &FilterSpec::default(),
                SortSpec::default(),
                spec.offset(),
                spec.limit,
            ))
            .unwrap();

            let expected = total.saturating_sub(spec.offset()).min(u64::from(limit));
            prop_assert_eq!(rows.len() as u64, expected);
        }

        #[test]
        fn prop_filter_is_sound_and_complete(
            incidents in proptest::collection::vec(arb_incident(), 0..60),
            filter in arb_filter(),
        ) {
            let expected = incidents.iter().filter(|i| filter.matches(i)).count() as u64;
            let store = InMemoryIncidentStore::with_incidents(incidents);

            let rows = block_on(store.find_many(&filter, SortSpec::default(), 0, 1_000)).unwrap();
            let total = block_on(store.count(&filter)).unwrap();

            prop_assert!(rows.iter().all(|i| filter.matches(i)));
            prop_assert_eq!(rows.len() as u64, expected);
            prop_assert_eq!(total, expected);
        }

        #[test]
        fn prop_rows_follow_sort(
            incidents in proptest::collection::vec(arb_incident(), 0..60),
            sort in arb_sort(),
        ) {
            let store = InMemoryIncidentStore::with_incidents(incidents);
            let rows = block_on(store.find_many(&FilterSpec::default(), sort, 0, 1_000)).unwrap();
            for pair in rows.windows(2) {
                prop_assert_ne!(sort.compare(&pair[0], &pair[1]), Ordering::Greater);
            }
        }

        #[test]
        fn prop_limit_bounds(limit in 0u32..500) {
            let params = ListParams {
                limit: Some(limit.to_string()),
                ..Default::default()
            };
            let parsed = IncidentQuery::parse(&params);
            if (1..=MAX_LIMIT).contains(&limit) {
                prop_assert_eq!(parsed.unwrap().page.limit, limit);
            } else {
                let err = parsed.unwrap_err();
                prop_assert!(err.details().unwrap().field_errors.contains_key("limit"));
            }
        }

        #[test]
        fn prop_page_zero_or_fractional_is_rejected(whole in 0u32..1_000, frac in 1u32..10) {
            let params = ListParams {
                page: Some(format!("{whole}.{frac}")),
                ..Default::default()
            };
            prop_assert!(IncidentQuery::parse(&params).is_err());

            let zero = ListParams {
                page: Some("0".to_string()),
                ..Default::default()
            };
            prop_assert!(IncidentQuery::parse(&zero).is_err());
        }
    }
}
