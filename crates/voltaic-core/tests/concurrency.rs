// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Voltaic.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

mod common;

use std::thread;

use chrono::{Duration, Utc};
use common::{sample, service};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("voltaic_core=debug")
        .try_init();
}

#[test]
fn concurrent_samples_open_one_alert_per_unit() {
    init_tracing();
    let service = service();
    let base = Utc::now() - Duration::hours(1);
    let units = ["inv-a", "inv-b", "inv-c"];

    thread::scope(|scope| {
        for worker in 0..8_i64 {
            let service = &service;
            scope.spawn(move || {
                for i in 0..25_i64 {
                    for unit in units {
                        let ts = base + Duration::seconds(worker * 100 + i);
                        let payload = serde_json::to_value(sample(unit, ts, 60.0)).unwrap();
                        service.ingest_telemetry(payload).unwrap();
                    }
                }
            });
        }
    });

    for unit in units {
        let alerts = service.alerts().list_alerts(unit, true).unwrap();
        assert_eq!(alerts.len(), 1, "{unit} should have exactly one alert");
    }
}

#[test]
fn concurrent_duplicate_deliveries_record_once() {
    init_tracing();
    let service = service();
    let s = sample("inv-dup", Utc::now() - Duration::minutes(2), 60.0);

    let recorded: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = &service;
                let payload = serde_json::to_value(&s).unwrap();
                scope.spawn(move || {
                    let response = service.ingest_telemetry(payload).unwrap();
                    usize::from(matches!(
                        response,
                        voltaic_types::TelemetryResponse::Single(ref r)
                            if r.status == voltaic_types::RecordStatus::Recorded
                    ))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(recorded, 1);
    assert_eq!(service.alerts().list_alerts("inv-dup", true).unwrap().len(), 1);
}
