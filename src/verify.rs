//! Broker Verification Module
//!
//! Checks the configured broker before a deployment: can we connect, does
//! the broker acknowledge the session, and will it accept a subscription to
//! the sensor topic. The report serializes to JSON for scripting.

use std::time::{Duration, Instant};

use chrono::Utc;
use rumqttc::{Client, Event, Packet, QoS, SubscribeReasonCode};
use serde::{Deserialize, Serialize};

use crate::config::BrokerConfig;
use crate::ingest::mqtt::mqtt_options;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerVerification {
    pub timestamp: String,
    pub host: String,
    pub port: u16,
    pub topic: String,
    pub status: VerificationStatus,
    pub connected: bool,
    pub subscribed: bool,
    /// Payloads seen on the topic while waiting (retained messages arrive right after SubAck).
    pub messages_seen: usize,
    pub elapsed_ms: u64,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

impl BrokerVerification {
    fn new(broker: &BrokerConfig) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            host: broker.host.clone(),
            port: broker.port,
            topic: broker.topic.clone(),
            status: VerificationStatus::Failed,
            connected: false,
            subscribed: false,
            messages_seen: 0,
            elapsed_ms: 0,
            error_message: None,
        }
    }

    /// Success: connected and subscribed. Partial: connected only.
    fn settle(&mut self) {
        self.status = match (self.connected, self.subscribed) {
            (true, true) => VerificationStatus::Success,
            (true, false) => VerificationStatus::PartialSuccess,
            _ => VerificationStatus::Failed,
        };
    }
}

// ============================================================================
// Broker Verification
// ============================================================================

/// Connects, subscribes, and reports what succeeded within `timeout`.
pub fn verify_broker(broker: &BrokerConfig, timeout: Duration) -> BrokerVerification {
    let mut result = BrokerVerification::new(broker);
    let started = Instant::now();
    let deadline = started + timeout;

    let (client, mut connection) = Client::new(mqtt_options(broker), 10);

    while !result.subscribed {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            result.error_message = Some(format!("Timed out after {}s", timeout.as_secs()));
            break;
        }

        match connection.recv_timeout(remaining) {
            Ok(Ok(Event::Incoming(Packet::ConnAck(_)))) => {
                result.connected = true;
                if let Err(e) = client.try_subscribe(broker.topic.as_str(), QoS::AtMostOnce) {
                    result.error_message = Some(format!("Subscribe request failed: {}", e));
                    break;
                }
            }
            Ok(Ok(Event::Incoming(Packet::SubAck(ack)))) => {
                if ack
                    .return_codes
                    .iter()
                    .any(|code| matches!(code, SubscribeReasonCode::Failure))
                {
                    result.error_message = Some("Broker refused subscription".to_string());
                    break;
                }
                result.subscribed = true;
            }
            Ok(Ok(Event::Incoming(Packet::Publish(_)))) => result.messages_seen += 1,
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                result.error_message = Some(format!("Connection failed: {}", e));
                break;
            }
            Err(_) => {
                result.error_message = Some(format!("Timed out after {}s", timeout.as_secs()));
                break;
            }
        }
    }

    let _ = client.try_disconnect();
    result.elapsed_ms = started.elapsed().as_millis() as u64;
    result.settle();
    result
}

/// Human-readable report for the console.
pub fn format_report(report: &BrokerVerification) -> String {
    let mark = |ok: bool| if ok { "✓" } else { "✗" };
    let mut out = String::new();
    out.push_str(&format!("\n🔍 Broker {}:{} ({})\n", report.host, report.port, report.topic));
    out.push_str(&format!("  Status:     {:?}\n", report.status));
    out.push_str(&format!("  Connected:  {}\n", mark(report.connected)));
    out.push_str(&format!("  Subscribed: {}\n", mark(report.subscribed)));
    out.push_str(&format!("  Elapsed:    {} ms\n", report.elapsed_ms));
    if let Some(error) = &report.error_message {
        out.push_str(&format!("  Error:      {}\n", error));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn report() -> BrokerVerification {
        BrokerVerification::new(&Config::default().broker())
    }

    #[test]
    fn test_status_settles_from_flags() {
        let mut r = report();
        r.settle();
        assert_eq!(r.status, VerificationStatus::Failed);

        r.connected = true;
        r.settle();
        assert_eq!(r.status, VerificationStatus::PartialSuccess);

        r.subscribed = true;
        r.settle();
        assert_eq!(r.status, VerificationStatus::Success);
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let mut r = report();
        r.connected = true;
        r.error_message = Some("Timed out after 5s".to_string());
        let json = serde_json::to_string(&r).expect("serializes");
        let back: BrokerVerification = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back.host, "broker.hivemq.com");
        assert!(back.connected);
        assert_eq!(back.error_message.as_deref(), Some("Timed out after 5s"));
    }

    #[test]
    fn test_format_report_shows_error() {
        let mut r = report();
        r.error_message = Some("Connection failed: refused".to_string());
        let text = format_report(&r);
        assert!(text.contains("broker.hivemq.com:1883"));
        assert!(text.contains("Connection failed: refused"));
    }

    #[test]
    fn test_unreachable_broker_fails_within_timeout() {
        // Port 1 on localhost refuses immediately on any sane machine.
        let broker = BrokerConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..Config::default().broker()
        };
        let r = verify_broker(&broker, Duration::from_secs(5));
        assert_eq!(r.status, VerificationStatus::Failed);
        assert!(!r.connected);
        assert!(r.error_message.is_some());
    }
}
