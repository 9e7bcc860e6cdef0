use std::{convert::Infallible, sync::Arc};

use gateway::NotificationGateway;
use warp::{
    filters::body::BodyDeserializeError,
    http::StatusCode,
    reject::{LengthRequired, MethodNotAllowed, PayloadTooLarge, UnsupportedMediaType},
    reply::Response,
    Filter, Rejection, Reply,
};
use wavesexchange_warp::{log::access, MetricsWarpBuilder};

use crate::{
    db::Storage,
    error::Error,
    flash::{self, FlashKey},
    views::Views,
};

const BODY_SIZE_LIMIT: u64 = 64 * 1024;

/// Process-wide dependencies, built once at startup.
#[derive(Clone)]
pub struct Services {
    pub storage: Arc<dyn Storage>,
    /// `None` when the gateway could not be initialized
    pub gateway: Option<Arc<dyn NotificationGateway>>,
    pub flash_key: FlashKey,
    pub views: Arc<Views>,
}

pub async fn start(port: u16, metrics_port: u16, services: Services) {
    let log = warp::log::custom(access);

    log::info!("Starting disaster alerts API server at 0.0.0.0:{}", port);

    let routes = routes(services).with(log);

    MetricsWarpBuilder::new()
        .with_main_routes(routes)
        .with_main_routes_port(port)
        .with_metrics_port(metrics_port)
        .run_async()
        .await;
}

pub fn routes(
    services: Services,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone + Send + Sync + 'static {
    let with_services = warp::any().map(move || services.clone());

    let limited_body = || warp::body::content_length_limit(BODY_SIZE_LIMIT);

    let dashboard = warp::path::end()
        .and(warp::get())
        .and(warp::cookie::optional::<String>(flash::COOKIE_NAME))
        .and(with_services.clone())
        .and_then(controllers::dashboard);

    let alert_submission = {
        let as_json = warp::body::json().map(dto::AlertRequest::Json);
        let as_form = warp::body::form().map(dto::AlertRequest::Form);
        limited_body().and(as_json.or(as_form).unify())
    };

    let send_alert = warp::path!("send_alert")
        .and(warp::post())
        .and(alert_submission)
        .and(with_services.clone())
        .and_then(controllers::send_alert);

    let alerts_history = warp::path!("alerts_history")
        .and(warp::get())
        .and(with_services.clone())
        .and_then(controllers::alerts_history);

    let alerts_list = warp::path!("api" / "alerts")
        .and(warp::get())
        .and(with_services.clone())
        .and_then(controllers::alerts_list);

    let register_token = warp::path!("api" / "register_token")
        .and(warp::post())
        .and(limited_body())
        .and(warp::body::json::<dto::TokenRequest>())
        .and(with_services.clone())
        .and_then(controllers::register_token);

    let emergency_assistance = warp::path!("api" / "emergency_assistance")
        .and(warp::post())
        .and(limited_body())
        .and(warp::body::json::<dto::AssistanceRequestBody>())
        .and(with_services.clone())
        .and_then(controllers::emergency_assistance);

    let assistance_requests = warp::path!("assistance_requests")
        .and(warp::get())
        .and(with_services.clone())
        .and_then(controllers::assistance_requests);

    let assistance_list = warp::path!("api" / "assistance_requests")
        .and(warp::get())
        .and(with_services.clone())
        .and_then(controllers::assistance_list);

    let health = warp::path!("health")
        .and(warp::get())
        .and(with_services)
        .and_then(controllers::health);

    dashboard
        .or(send_alert)
        .or(alerts_history)
        .or(alerts_list)
        .or(register_token)
        .or(emergency_assistance)
        .or(assistance_requests)
        .or(assistance_list)
        .or(health)
        .recover(handle_rejection)
}

async fn handle_rejection(rej: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if rej.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(err) = rej.find::<Error>() {
        if err.status_code().is_server_error() {
            log::error!("Request failed: {}", err);
        }
        (err.status_code(), err.to_string())
    } else if let Some(err) = rej.find::<BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", err),
        )
    } else if rej.find::<UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Unsupported content type".to_string(),
        )
    } else if rej.find::<PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body is too large".to_string(),
        )
    } else if rej.find::<LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            "Content-Length is required".to_string(),
        )
    } else if rej.find::<MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else {
        log::error!("{:?}", rej);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    let body = warp::reply::json(&dto::ErrorResponse { error: message });
    Ok(warp::reply::with_status(body, status).into_response())
}

mod controllers {
    use super::{dto, Services};
    use crate::{
        dispatch::{self, Delivery, Dispatched},
        error::Error,
        flash::{self, Flash},
    };
    use chrono::Utc;
    use database::{alert, assistance};
    use model::{
        alert::NewAlert,
        assistance::{AssistanceSubmission, NewAssistanceRequest},
        device::TokenRegistration,
        time::iso8601,
    };
    use warp::{
        http::Uri,
        reply::{self, Response},
        Rejection, Reply,
    };

    const ALERT_SENT: &str = "Alert sent successfully";

    fn redirect_with_flash(services: &Services, flash: Flash) -> Response {
        let cookie = flash::set_cookie_header(&services.flash_key.seal(&flash));
        reply::with_header(warp::redirect::see_other(Uri::from_static("/")), "set-cookie", cookie)
            .into_response()
    }

    async fn accept_alert(
        submission: dto::AlertSubmission,
        services: &Services,
    ) -> Result<Dispatched, Error> {
        let alert = NewAlert::from_submission(
            submission.disaster_type,
            submission.message,
            submission.latitude,
            submission.longitude,
        )?;
        dispatch::submit_alert(services.storage.as_ref(), services.gateway.as_deref(), alert).await
    }

    pub async fn dashboard(
        flash_cookie: Option<String>,
        services: Services,
    ) -> Result<Response, Rejection> {
        let flash = flash_cookie
            .as_deref()
            .and_then(|cookie| services.flash_key.open(cookie));

        let page = services
            .views
            .dashboard(flash.as_ref(), services.gateway.is_some())
            .map_err(Error::from)?;
        let html = reply::html(page);

        // The flash is shown once, whatever the cookie contained
        match flash_cookie {
            Some(_) => {
                Ok(reply::with_header(html, "set-cookie", flash::clear_cookie_header()).into_response())
            }
            None => Ok(html.into_response()),
        }
    }

    pub async fn send_alert(
        request: dto::AlertRequest,
        services: Services,
    ) -> Result<Response, Rejection> {
        let (submission, from_form) = match request {
            dto::AlertRequest::Json(s) => (s, false),
            dto::AlertRequest::Form(s) => (s, true),
        };

        let result = accept_alert(submission, &services).await;

        match (result, from_form) {
            (Ok(dispatched), from_form) => {
                if let Delivery::Failed(reason) = &dispatched.delivery {
                    log::warn!(
                        "Alert #{} stored but not delivered: {}",
                        dispatched.alert_id,
                        reason
                    );
                }
                if from_form {
                    Ok(redirect_with_flash(
                        &services,
                        Flash::success(format!("{ALERT_SENT}!")),
                    ))
                } else {
                    Ok(reply::json(&dto::AlertAccepted {
                        success: true,
                        message: ALERT_SENT,
                        alert_id: dispatched.alert_id,
                    })
                    .into_response())
                }
            }
            (Err(err), true) => {
                let message = match &err {
                    Error::ValidationError(e) => e.to_string(),
                    other => {
                        log::error!("Error in send_alert: {}", other);
                        format!("Error sending alert: {}", other)
                    }
                };
                Ok(redirect_with_flash(&services, Flash::error(message)))
            }
            (Err(err), false) => Err(err.into()),
        }
    }

    pub async fn alerts_history(services: Services) -> Result<Response, Rejection> {
        let alerts = services
            .storage
            .list_alerts(alert::DEFAULT_LIST_LIMIT)
            .await?;
        let page = services.views.alerts_history(&alerts).map_err(Error::from)?;
        Ok(reply::html(page).into_response())
    }

    pub async fn alerts_list(services: Services) -> Result<Response, Rejection> {
        let alerts = services
            .storage
            .list_alerts(alert::DEFAULT_LIST_LIMIT)
            .await?;
        Ok(reply::json(&alerts).into_response())
    }

    pub async fn register_token(
        body: dto::TokenRequest,
        services: Services,
    ) -> Result<Response, Rejection> {
        let registration =
            TokenRegistration::new(body.token, body.device_info).map_err(Error::from)?;

        let stored = services.storage.upsert_token(&registration).await?;
        log::debug!(
            "Token registered for device {:?} at {}",
            stored.device_info,
            iso8601(&stored.registered_at)
        );

        Ok(reply::json(&dto::Acknowledged {
            success: true,
            message: "Token registered successfully",
        })
        .into_response())
    }

    pub async fn emergency_assistance(
        body: dto::AssistanceRequestBody,
        services: Services,
    ) -> Result<Response, Rejection> {
        let request = NewAssistanceRequest::from_submission(AssistanceSubmission {
            token: body.token,
            user_name: body.user_name,
            latitude: body.latitude,
            longitude: body.longitude,
            message: body.message,
            device_info: body.device_info,
        })
        .map_err(Error::from)?;

        let (request_id, created_at) = services.storage.insert_assistance_request(&request).await?;
        log::info!(
            "Emergency assistance request received: ID {}, Location: {}",
            request_id,
            request.location
        );

        Ok(reply::json(&dto::AssistanceAccepted {
            success: true,
            message: "Emergency assistance request received",
            request_id,
            timestamp: iso8601(&created_at),
        })
        .into_response())
    }

    pub async fn assistance_requests(services: Services) -> Result<Response, Rejection> {
        let requests = services
            .storage
            .list_assistance_requests(assistance::DEFAULT_LIST_LIMIT)
            .await?;
        let page = services
            .views
            .assistance_requests(&requests)
            .map_err(Error::from)?;
        Ok(reply::html(page).into_response())
    }

    pub async fn assistance_list(services: Services) -> Result<Response, Rejection> {
        let requests = services
            .storage
            .list_assistance_requests(assistance::DEFAULT_LIST_LIMIT)
            .await?;
        Ok(reply::json(&requests).into_response())
    }

    pub async fn health(services: Services) -> Result<Response, Rejection> {
        Ok(reply::json(&dto::Health {
            status: "healthy",
            timestamp: iso8601(&Utc::now()),
            notification_gateway_initialized: services.gateway.is_some(),
        })
        .into_response())
    }
}

mod dto {
    use model::location::CoordinateInput;
    use serde::{Deserialize, Serialize};

    #[derive(Deserialize)]
    pub struct AlertSubmission {
        pub disaster_type: Option<String>,
        pub message: Option<String>,
        pub latitude: Option<CoordinateInput>,
        pub longitude: Option<CoordinateInput>,
    }

    /// Alert submission tagged with the way it arrived, which decides the
    /// shape of the reply.
    pub enum AlertRequest {
        Json(AlertSubmission),
        Form(AlertSubmission),
    }

    #[derive(Deserialize)]
    pub struct TokenRequest {
        pub token: Option<String>,
        pub device_info: Option<String>,
    }

    #[derive(Deserialize)]
    pub struct AssistanceRequestBody {
        pub token: Option<String>,
        pub user_name: Option<String>,
        pub latitude: Option<CoordinateInput>,
        pub longitude: Option<CoordinateInput>,
        pub message: Option<String>,
        pub device_info: Option<String>,
    }

    #[derive(Serialize)]
    pub struct AlertAccepted {
        pub success: bool,
        pub message: &'static str,
        pub alert_id: i32,
    }

    #[derive(Serialize)]
    pub struct Acknowledged {
        pub success: bool,
        pub message: &'static str,
    }

    #[derive(Serialize)]
    pub struct AssistanceAccepted {
        pub success: bool,
        pub message: &'static str,
        pub request_id: i32,
        pub timestamp: String,
    }

    #[derive(Serialize)]
    pub struct Health {
        pub status: &'static str,
        pub timestamp: String,
        pub notification_gateway_initialized: bool,
    }

    #[derive(Serialize)]
    pub struct ErrorResponse {
        pub error: String,
    }
}
