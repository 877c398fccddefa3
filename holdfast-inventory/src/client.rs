use async_trait::async_trait;
use holdfast_core::{BookingError, FlightQuote, InventoryApi};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// HTTP client for the remote flight service.
///
/// Timeouts are left to the transport configuration of the caller; this
/// client does not retry, so a transient failure surfaces as an error of the
/// enclosing saga step.
#[derive(Clone)]
pub struct FlightServiceClient {
    client: Client,
    base_url: String,
}

/// The flight service wraps payloads in a `{ success, data }` envelope.
#[derive(Debug, Deserialize)]
struct FlightEnvelope {
    data: FlightData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlightData {
    total_seats: i32,
    price: i32,
}

/// `dec: true` consumes seats, `dec: false` credits them back. The two are
/// inverses for equal `seats` values.
#[derive(Debug, Serialize)]
struct SeatAdjustment {
    seats: i32,
    dec: bool,
}

impl FlightServiceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn flight_url(&self, flight_id: Uuid) -> String {
        format!("{}/api/v1/flights/{}", self.base_url, flight_id)
    }

    async fn adjust_seats(
        &self,
        flight_id: Uuid,
        seats: i32,
        dec: bool,
    ) -> Result<(), BookingError> {
        let response = self
            .client
            .patch(format!("{}/seats", self.flight_url(flight_id)))
            .json(&SeatAdjustment { seats, dec })
            .send()
            .await
            .map_err(|e| BookingError::RemoteUnavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(%flight_id, seats, dec, "adjusted flight seats");
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(BookingError::RemoteRejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl InventoryApi for FlightServiceClient {
    async fn quote(&self, flight_id: Uuid) -> Result<FlightQuote, BookingError> {
        let response = self
            .client
            .get(self.flight_url(flight_id))
            .send()
            .await
            .map_err(|e| BookingError::RemoteUnavailable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let envelope =
                    response
                        .json::<FlightEnvelope>()
                        .await
                        .map_err(|e| BookingError::RemoteRejected {
                            status: StatusCode::OK.as_u16(),
                            message: format!("malformed flight payload: {}", e),
                        })?;

                Ok(FlightQuote {
                    total_seats: envelope.data.total_seats,
                    price: envelope.data.price,
                })
            }
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(BookingError::RemoteRejected {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn reserve(&self, flight_id: Uuid, seats: i32) -> Result<(), BookingError> {
        self.adjust_seats(flight_id, seats, true).await
    }

    async fn release(&self, flight_id: Uuid, seats: i32) -> Result<(), BookingError> {
        self.adjust_seats(flight_id, seats, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn quote_unwraps_the_data_envelope() {
        let server = MockServer::start().await;
        let flight_id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path(format!("/api/v1/flights/{}", flight_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "totalSeats": 10, "price": 100 }
            })))
            .mount(&server)
            .await;

        let client = FlightServiceClient::new(server.uri());
        let quote = client.quote(flight_id).await.unwrap();
        assert_eq!(quote.total_seats, 10);
        assert_eq!(quote.price, 100);
    }

    #[tokio::test]
    async fn reserve_patches_seats_with_decrement_flag() {
        let server = MockServer::start().await;
        let flight_id = Uuid::new_v4();

        Mock::given(method("PATCH"))
            .and(path(format!("/api/v1/flights/{}/seats", flight_id)))
            .and(body_json(json!({ "seats": 2, "dec": true })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = FlightServiceClient::new(server.uri());
        client.reserve(flight_id, 2).await.unwrap();
    }

    #[tokio::test]
    async fn release_is_the_inverse_adjustment() {
        let server = MockServer::start().await;
        let flight_id = Uuid::new_v4();

        Mock::given(method("PATCH"))
            .and(path(format!("/api/v1/flights/{}/seats", flight_id)))
            .and(body_json(json!({ "seats": 2, "dec": false })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = FlightServiceClient::new(server.uri());
        client.release(flight_id, 2).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_maps_to_remote_rejected() {
        let server = MockServer::start().await;
        let flight_id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path(format!("/api/v1/flights/{}", flight_id)))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such flight"))
            .mount(&server)
            .await;

        let client = FlightServiceClient::new(server.uri());
        match client.quote(flight_id).await {
            Err(BookingError::RemoteRejected { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such flight");
            }
            other => panic!("expected RemoteRejected, got {:?}", other.map(|q| q.total_seats)),
        }
    }

    #[tokio::test]
    async fn unreachable_service_maps_to_remote_unavailable() {
        // Nothing is listening on this port.
        let client = FlightServiceClient::new("http://127.0.0.1:1");
        let err = client.quote(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, BookingError::RemoteUnavailable(_)));
    }
}
