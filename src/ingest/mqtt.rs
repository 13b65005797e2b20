/// MQTT ingest listener.
///
/// Holds one subscription to the configured topic and pushes every payload
/// through the parser into the shared reading. Runs on its own thread with
/// the blocking `rumqttc::Client`, so the render loop is never held up by
/// the network.
///
/// Reconnection is left to rumqttc: after a `ConnectionError` the next
/// iteration of the connection reconnects. The listener only pauses briefly
/// so an unreachable broker does not spin the thread, and re-subscribes on
/// every `ConnAck` because a clean session drops subscriptions.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rumqttc::{Client, Event, MqttOptions, Packet, QoS, SubscribeReasonCode};

use crate::config::BrokerConfig;
use crate::ingest::{SharedReading, ingest_and_log};
use crate::logging::{self, Component};

/// Outstanding client requests (subscribe/disconnect) buffered for the event loop.
const REQUEST_CAPACITY: usize = 10;

/// Pause after a connection error before polling (and so reconnecting) again.
pub const RECONNECT_PAUSE: Duration = Duration::from_secs(1);

/// Name of the listener thread, visible in panics and debuggers.
pub const THREAD_NAME: &str = "mqtt-ingest";

pub struct IngestListener {
    broker: BrokerConfig,
    shared: Arc<SharedReading>,
}

impl IngestListener {
    pub fn new(broker: BrokerConfig, shared: Arc<SharedReading>) -> Self {
        Self { broker, shared }
    }

    /// `host:port/topic`, used as log context.
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.broker.host, self.broker.port, self.broker.topic)
    }

    pub fn mqtt_options(&self) -> MqttOptions {
        mqtt_options(&self.broker)
    }

    /// Starts the listener on a dedicated, named thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || self.run())
    }

    /// Drives the connection on the current thread. Returns only if the
    /// client handle is dropped, which never happens while `run` owns it.
    pub fn run(self) {
        let endpoint = self.endpoint();
        let (client, mut connection) = Client::new(self.mqtt_options(), REQUEST_CAPACITY);
        logging::info(
            Component::Mqtt,
            Some(&endpoint),
            &format!("connecting as '{}'", self.broker.client_id),
        );

        for notification in connection.iter() {
            match notification {
                Ok(event) => self.handle_event(&client, &endpoint, event),
                Err(e) => {
                    logging::log_connection_failure(&endpoint, &e);
                    thread::sleep(RECONNECT_PAUSE);
                }
            }
        }

        logging::warn(Component::Mqtt, Some(&endpoint), "connection closed, listener stopped");
    }

    fn handle_event(&self, client: &Client, endpoint: &str, event: Event) {
        match event {
            Event::Incoming(Packet::ConnAck(_)) => {
                logging::info(Component::Mqtt, Some(endpoint), "connected, subscribing");
                // try_subscribe: a blocking send from inside the event loop
                // could wait on a full request queue that only this loop drains.
                if let Err(e) = client.try_subscribe(self.broker.topic.as_str(), QoS::AtMostOnce) {
                    logging::error(
                        Component::Mqtt,
                        Some(endpoint),
                        &format!("subscribe request failed: {}", e),
                    );
                }
            }
            Event::Incoming(Packet::SubAck(ack)) => {
                if ack
                    .return_codes
                    .iter()
                    .any(|code| matches!(code, SubscribeReasonCode::Failure))
                {
                    logging::error(Component::Mqtt, Some(endpoint), "broker refused subscription");
                } else {
                    logging::info(Component::Mqtt, Some(endpoint), "subscribed");
                }
            }
            Event::Incoming(Packet::Publish(publish)) => {
                self.accept_publish(&publish.topic, &publish.payload);
            }
            Event::Incoming(Packet::Disconnect) => {
                logging::warn(Component::Mqtt, Some(endpoint), "broker sent disconnect");
            }
            _ => {}
        }
    }

    /// Feeds one publish to the parser. Publishes on any other topic are
    /// ignored; returns whether the payload was ours.
    pub fn accept_publish(&self, topic: &str, payload: &[u8]) -> bool {
        if topic != self.broker.topic {
            logging::debug(
                Component::Mqtt,
                Some(topic),
                "ignoring publish on unexpected topic",
            );
            return false;
        }
        ingest_and_log(&self.shared, topic, payload);
        true
    }
}

/// Client options for a broker config: keep-alive from config, clean session.
pub fn mqtt_options(broker: &BrokerConfig) -> MqttOptions {
    let mut options = MqttOptions::new(broker.client_id.clone(), broker.host.clone(), broker.port);
    options.set_keep_alive(broker.keep_alive);
    options.set_clean_session(true);
    options
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::Reading;

    fn listener() -> (Arc<SharedReading>, IngestListener) {
        let shared = Arc::new(SharedReading::new());
        let broker = Config::default().broker();
        (Arc::clone(&shared), IngestListener::new(broker, shared))
    }

    #[test]
    fn test_endpoint_names_host_port_and_topic() {
        let (_, listener) = listener();
        assert_eq!(listener.endpoint(), "broker.hivemq.com:1883/enchente/nivel");
    }

    #[test]
    fn test_options_carry_broker_settings() {
        let (_, listener) = listener();
        let options = listener.mqtt_options();
        assert_eq!(
            options.broker_address(),
            ("broker.hivemq.com".to_string(), 1883)
        );
        assert_eq!(options.keep_alive(), Duration::from_secs(60));
        assert!(options.clean_session());
    }

    #[test]
    fn test_publish_on_configured_topic_updates_reading() {
        let (shared, listener) = listener();
        assert!(listener.accept_publish("enchente/nivel", b"Nivel: 180 cm | T: 22 | U: 65"));
        assert_eq!(shared.current_reading(), Reading::new(180.0, 22.0, 65.0));
    }

    #[test]
    fn test_publish_on_other_topic_is_ignored() {
        let (shared, listener) = listener();
        assert!(!listener.accept_publish("enchente/outro", b"Nivel: 180 cm | T: 22 | U: 65"));
        assert_eq!(shared.current_reading(), Reading::default());
        assert_eq!(shared.snapshot().rejected, 0);
    }

    #[test]
    fn test_malformed_publish_keeps_previous_reading() {
        let (shared, listener) = listener();
        listener.accept_publish("enchente/nivel", b"Nivel: 90 cm | T: 22 | U: 65");
        listener.accept_publish("enchente/nivel", b"Nivel: ?? cm | T: 22 | U: 65");
        assert_eq!(shared.current_reading().water_level_cm, 90.0);
        assert_eq!(shared.snapshot().rejected, 1);
    }
}
