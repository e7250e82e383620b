//! JSON-RPC server
//!
//! Serves `POST /jsonrpc` and dispatches each request to the
//! [`RemoteFacade`]. Façade calls only take short, non-blocking locks, so
//! handlers call them inline.

use std::io;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use cosim_core::ReadMode;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::facade::RemoteFacade;
use crate::protocol::{
    error_response, methods, success_response, Empty, Envelope, Params, ReceivedData, RpcError,
    RpcRequest,
};

/// Path the RPC endpoint is served on
pub const RPC_PATH: &str = "/jsonrpc";

/// Build the RPC router
pub fn router(facade: Arc<RemoteFacade>) -> Router {
    Router::new()
        .route(RPC_PATH, post(handle_json_rpc))
        .with_state(facade)
}

/// Serve requests on `listener` until `shutdown` fires or its sender drops
pub async fn serve(
    listener: TcpListener,
    facade: Arc<RemoteFacade>,
    shutdown: oneshot::Receiver<()>,
) -> io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("JSON-RPC server listening on http://{}{}", addr, RPC_PATH);
    }

    axum::serve(listener, router(facade))
        .with_graceful_shutdown(async move {
            let _ = shutdown.await;
        })
        .await?;

    info!("JSON-RPC server stopped");
    Ok(())
}

async fn handle_json_rpc(State(facade): State<Arc<RemoteFacade>>, body: String) -> Response {
    let request: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!("Rejected unparsable request: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(error_response(Value::Null, &RpcError::parse_error(e))),
            )
                .into_response();
        }
    };

    match request {
        Value::Array(requests) if requests.is_empty() => Json(error_response(
            Value::Null,
            &RpcError::invalid_request("empty batch"),
        ))
        .into_response(),
        Value::Array(requests) => {
            let responses: Vec<Value> = requests
                .into_iter()
                .filter_map(|request| process_single_request(&facade, request))
                .collect();
            if responses.is_empty() {
                StatusCode::NO_CONTENT.into_response()
            } else {
                Json(Value::Array(responses)).into_response()
            }
        }
        request => match process_single_request(&facade, request) {
            Some(response) => Json(response).into_response(),
            None => StatusCode::NO_CONTENT.into_response(),
        },
    }
}

/// Handle one request; `None` for notifications
fn process_single_request(facade: &RemoteFacade, raw: Value) -> Option<Value> {
    let request: RpcRequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(e) => {
            return Some(error_response(
                Value::Null,
                &RpcError::invalid_request(e),
            ))
        }
    };

    if request.jsonrpc.as_deref().is_some_and(|v| v != "2.0") {
        return request.id.map(|id| {
            error_response(id, &RpcError::invalid_request("jsonrpc must be \"2.0\""))
        });
    }

    debug!("RPC {} params={}", request.method, request.params);
    let outcome = dispatch(facade, &request.method, &Params::new(&request.params));
    if let Err(e) = &outcome {
        debug!("RPC {} failed: {}", request.method, e.message);
    }

    let id = request.id?;
    Some(match outcome {
        Ok(envelope) => success_response(id, &envelope),
        Err(error) => error_response(id, &error),
    })
}

/// Route a method to the façade
fn dispatch(facade: &RemoteFacade, method: &str, params: &Params) -> Result<Envelope, RpcError> {
    let envelope = match method {
        methods::GET_VVC_LIST => Envelope::from_result(Ok(facade.list_instances())),
        methods::TRANSMIT_BYTES => {
            let vvc_type: String = params.get(0, "vvc_type")?;
            let vvc_id: i32 = params.get(1, "vvc_id")?;
            let data: Vec<u8> = params.get(2, "data")?;
            Envelope::from_result(facade.transmit(&vvc_type, vvc_id, &data).map(|()| Empty {}))
        }
        methods::TRANSMIT_PACKET => {
            let vvc_type: String = params.get(0, "vvc_type")?;
            let vvc_id: i32 = params.get(1, "vvc_id")?;
            let data: Vec<u8> = params.get(2, "data")?;
            Envelope::from_result(
                facade
                    .transmit_packet(&vvc_type, vvc_id, &data)
                    .map(|()| Empty {}),
            )
        }
        methods::RECEIVE_BYTES => {
            let vvc_type: String = params.get(0, "vvc_type")?;
            let vvc_id: i32 = params.get(1, "vvc_id")?;
            let length: i64 = params.get(2, "length")?;
            let all_or_nothing: bool = params.get(3, "all_or_nothing")?;
            Envelope::from_result(
                facade
                    .receive(
                        &vvc_type,
                        vvc_id,
                        length,
                        ReadMode::from_all_or_nothing(all_or_nothing),
                    )
                    .map(|data| ReceivedData { data }),
            )
        }
        methods::RECEIVE_PACKET => {
            let vvc_type: String = params.get(0, "vvc_type")?;
            let vvc_id: i32 = params.get(1, "vvc_id")?;
            Envelope::from_result(
                facade
                    .receive_packet(&vvc_type, vvc_id)
                    .map(|data| ReceivedData { data }),
            )
        }
        methods::START_SIM => {
            facade.begin_simulation();
            Envelope::from_result(Ok(Empty {}))
        }
        other => return Err(RpcError::method_not_found(other)),
    };

    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::BeginGate;
    use crate::protocol::codes;
    use cosim_core::{ChannelMap, InstanceIdentity, Registry};
    use serde_json::json;

    fn facade() -> (RemoteFacade, Arc<Registry>) {
        let registry = Arc::new(Registry::new());
        registry.register(InstanceIdentity::new("UART_VVC", "TX", 0), "");
        registry.register(InstanceIdentity::new("UART_VVC", "RX", 0), "");
        let facade = RemoteFacade::new(
            Arc::clone(&registry),
            ChannelMap::default(),
            Arc::new(BeginGate::new()),
        );
        (facade, registry)
    }

    #[test]
    fn test_transmit_then_list() {
        let (facade, registry) = facade();

        let response = process_single_request(
            &facade,
            json!({"jsonrpc": "2.0", "method": "TransmitBytes",
                   "params": {"vvc_type": "UART_VVC", "vvc_id": 0, "data": [7, 8]}, "id": 1}),
        )
        .unwrap();
        assert_eq!(response["result"], json!({"success": true, "result": {}}));
        assert_eq!(
            registry
                .lookup(&InstanceIdentity::new("UART_VVC", "TX", 0))
                .unwrap()
                .transmit()
                .len(),
            2
        );

        let list = process_single_request(
            &facade,
            json!({"jsonrpc": "2.0", "method": "GetVvcList", "id": 2}),
        )
        .unwrap();
        assert_eq!(list["result"]["result"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_receive_positional() {
        let (facade, registry) = facade();
        registry
            .lookup(&InstanceIdentity::new("UART_VVC", "RX", 0))
            .unwrap()
            .receive()
            .push(&[1, 2, 3]);

        let response = process_single_request(
            &facade,
            json!({"jsonrpc": "2.0", "method": "ReceiveBytes",
                   "params": ["UART_VVC", 0, 2, true], "id": "r"}),
        )
        .unwrap();

        assert_eq!(response["id"], "r");
        assert_eq!(response["result"]["result"]["data"], json!([1, 2]));
    }

    #[test]
    fn test_unknown_method() {
        let (facade, _) = facade();

        let response =
            process_single_request(&facade, json!({"jsonrpc": "2.0", "method": "Nope", "id": 3}))
                .unwrap();

        assert_eq!(response["error"]["code"], codes::METHOD_NOT_FOUND);
    }

    #[test]
    fn test_notification_has_no_response() {
        let (facade, _) = facade();

        assert!(process_single_request(
            &facade,
            json!({"jsonrpc": "2.0", "method": "StartSim"})
        )
        .is_none());
    }

    #[test]
    fn test_null_id_still_answered() {
        let (facade, _) = facade();

        let response = process_single_request(
            &facade,
            json!({"jsonrpc": "2.0", "method": "GetVvcList", "id": null}),
        )
        .unwrap();

        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["result"]["success"], true);
    }

    #[test]
    fn test_wrong_version_rejected() {
        let (facade, _) = facade();

        let response = process_single_request(
            &facade,
            json!({"jsonrpc": "1.0", "method": "GetVvcList", "id": 4}),
        )
        .unwrap();

        assert_eq!(response["error"]["code"], codes::INVALID_REQUEST);
    }
}
