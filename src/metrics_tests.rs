// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for metrics recording and rendering

#[cfg(test)]
mod tests {
    use crate::metrics::{record_dns_operation, record_reconciliation, render};
    use std::time::Duration;

    // The registry is a process-wide static shared across tests, so these
    // assert on presence rather than exact counter values.

    #[test]
    fn test_dns_operations_are_rendered() {
        record_dns_operation("create", true);
        record_dns_operation("delete", false);

        let output = render();
        assert!(output.contains("gwdns_dns_operations_total"));
        assert!(output.contains("operation=\"create\""));
        assert!(output.contains("status=\"error\""));
    }

    #[test]
    fn test_reconciliations_are_rendered() {
        record_reconciliation(true, Duration::from_millis(25));
        record_reconciliation(false, Duration::from_millis(250));

        let output = render();
        assert!(output.contains("gwdns_reconciliations_total"));
        assert!(output.contains("gwdns_reconciliation_duration_seconds"));
        assert!(output.contains("status=\"success\""));
    }

    #[tokio::test]
    async fn test_probe_endpoints_respond() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        tokio::spawn(async move {
            let _ = crate::metrics::serve(&addr.to_string()).await;
        });
        // give the server a moment to bind
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = reqwest::Client::new();
        let healthz = client
            .get(format!("http://{addr}/healthz"))
            .send()
            .await
            .unwrap();
        assert!(healthz.status().is_success());

        let metrics = client
            .get(format!("http://{addr}/metrics"))
            .send()
            .await
            .unwrap();
        assert!(metrics.status().is_success());
    }
}
