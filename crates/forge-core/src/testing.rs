//! One-shot HTTP server for exercising the client against canned replies.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use tokio::sync::oneshot;

/// What the server saw of the first request
#[derive(Debug)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Answer every request with `status` and `body`. Returns the base URL and a
/// receiver yielding the first request received.
pub async fn serve_once(status: u16, body: &'static str) -> (String, oneshot::Receiver<ReceivedRequest>) {
    let status = StatusCode::from_u16(status).unwrap();
    let (tx, rx) = oneshot::channel();
    let tx = Arc::new(Mutex::new(Some(tx)));

    let make_svc = make_service_fn(move |_conn| {
        let tx = tx.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                let tx = tx.clone();
                async move {
                    let method = req.method().to_string();
                    let path = req.uri().path().to_string();
                    let bytes = hyper::body::to_bytes(req.into_body()).await.unwrap_or_default();

                    let sender = tx.lock().ok().and_then(|mut slot| slot.take());
                    if let Some(sender) = sender {
                        let _ = sender.send(ReceivedRequest {
                            method,
                            path,
                            body: String::from_utf8_lossy(&bytes).into_owned(),
                        });
                    }

                    Response::builder()
                        .status(status)
                        .header("content-type", "application/x-ndjson")
                        .body(Body::from(body))
                }
            }))
        }
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let server = Server::bind(&addr).serve(make_svc);
    let local_addr = server.local_addr();
    tokio::spawn(server);

    (format!("http://{local_addr}"), rx)
}
