//! Inbound-webhook HTTP listener.

use std::sync::Arc;

use {
    axum::{
        Json, Router,
        extract::State,
        http::StatusCode,
        routing::{get, post},
    },
    teloxide::{prelude::*, types::Update},
    tracing::{error, info},
};

use crate::handlers::{self, HandlerContext};

/// Register the webhook with Telegram and serve updates until SIGINT or
/// SIGTERM.
pub async fn serve(ctx: Arc<HandlerContext>, webhook_url: &str, port: u16) -> anyhow::Result<()> {
    let url = reqwest::Url::parse(webhook_url)?;
    ctx.bot.set_webhook(url).await?;
    info!(webhook_url, "webhook registered");

    let app = router(ctx);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "webhook server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("webhook server stopped");
    Ok(())
}

/// `POST /` receives updates; `GET /health` is a liveness probe.
pub fn router(ctx: Arc<HandlerContext>) -> Router {
    Router::new()
        .route("/", post(receive_update))
        .route("/health", get(health))
        .with_state(ctx)
}

async fn receive_update(
    State(ctx): State<Arc<HandlerContext>>,
    Json(update): Json<Update>,
) -> StatusCode {
    if let Err(e) = handlers::handle_update(update, &ctx).await {
        error!(error = %e, "webhook update failed");
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    StatusCode::OK
}

async fn health() -> &'static str {
    "OK"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use {
        async_trait::async_trait,
        axum::{body::Body, http::Request},
        tower::ServiceExt,
    };

    use bookferry_pipeline::{
        deliver::{DeliveryError, Mailer},
        pipeline::IngestionPipeline,
        transfer::{FileSource, TransferError},
    };

    use super::*;

    struct NoopSource;

    #[async_trait]
    impl FileSource for NoopSource {
        async fn fetch(&self, _file_ref: &str, _dest: &Path) -> Result<(), TransferError> {
            Ok(())
        }
    }

    struct NoopMailer;

    #[async_trait]
    impl Mailer for NoopMailer {
        async fn deliver(
            &self,
            _file_path: &Path,
            _display_filename: &str,
        ) -> Result<(), DeliveryError> {
            Ok(())
        }
    }

    fn test_ctx() -> Arc<HandlerContext> {
        let pipeline = Arc::new(IngestionPipeline::new(
            vec![],
            "downloads",
            Arc::new(NoopSource),
            Arc::new(NoopMailer),
        ));
        Arc::new(HandlerContext {
            bot: Bot::new("test-token"),
            pipeline,
        })
    }

    #[tokio::test]
    async fn health_endpoint_answers_ok() {
        let app = router(test_ctx());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_update_is_rejected() {
        let app = router(test_ctx());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"not\": \"an update\"}"))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert!(response.status().is_client_error());
    }
}
