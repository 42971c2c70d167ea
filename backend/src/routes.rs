use std::path::PathBuf;
use std::str::FromStr;

use actix_files::Files;
use actix_multipart::{Field, Multipart};
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use futures::{StreamExt, TryStreamExt};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::{CareTipsRequest, ConservationStatus, Locale, PlantQuery, ScanOutcome};
use uuid::Uuid;

use crate::config::UploadLimits;
use crate::directory::PlantDirectory;
use crate::error::{ScanError, ScanResult};
use crate::identify::intake::{accept_image, check_size, image_digest};
use crate::identify::{IdentificationRequest, PlantIdentifier};

const SCAN_ID_HEADER: &str = "X-Scan-Id";
const SCAN_ID_HEADER_NAME: &str = "x-scan-id";
const MAX_PROMPT_BYTES: usize = 4 * 1024;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Deserialize)]
struct LocaleQuery {
    locale: Option<String>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: Option<PathBuf>) {
    cfg.service(web::resource("/api/identify").route(web::post().to(identify_plant)))
        .service(
            web::resource("/api/care-tips")
                .app_data(web::JsonConfig::default().error_handler(care_tips_body_error))
                .route(web::post().to(care_tips)),
        )
        .service(web::resource("/api/plants").route(web::get().to(list_plants)))
        .service(web::resource("/api/plants/{id}").route(web::get().to(get_plant)))
        .service(web::resource("/api/regions").route(web::get().to(list_regions)))
        .service(
            web::resource("/api/conservation-statuses")
                .route(web::get().to(conservation_statuses)),
        )
        .service(web::resource("/health").route(web::get().to(health)));

    if let Some(dir) = static_dir {
        cfg.service(Files::new("/", dir).index_file("index.html"));
    }
}

/// Form fields of an identification upload.
#[derive(Default)]
struct Upload {
    image: Option<Vec<u8>>,
    declared_mime: Option<String>,
    prompt: Option<String>,
}

async fn identify_plant(
    identifier: web::Data<PlantIdentifier>,
    limits: web::Data<UploadLimits>,
    payload: Multipart,
) -> HttpResponse {
    let scan_id = Uuid::new_v4();
    let result = run_identification(&identifier, &limits, payload, scan_id).await;
    scan_response(scan_id, result)
}

async fn run_identification(
    identifier: &PlantIdentifier,
    limits: &UploadLimits,
    payload: Multipart,
    scan_id: Uuid,
) -> ScanResult<shared::PlantIdentification> {
    let upload = read_upload(payload, limits).await?;
    let bytes = upload
        .image
        .ok_or_else(|| ScanError::Input("No image was uploaded".to_string()))?;
    let image = accept_image(bytes, upload.declared_mime.as_deref(), limits)?;

    info!(
        "Scan {}: identifying {} image ({} bytes, sha256 {})",
        scan_id,
        image.mime.as_str(),
        image.bytes.len(),
        image_digest(&image.bytes)
    );

    let mut request = IdentificationRequest::new(image);
    if let Some(template) = upload.prompt.filter(|p| !p.trim().is_empty()) {
        request = request.with_prompt_template(template);
    }
    identifier.identify(&request).await
}

async fn read_upload(mut payload: Multipart, limits: &UploadLimits) -> ScanResult<Upload> {
    let mut upload = Upload::default();

    while let Some(field) = payload.try_next().await.map_err(malformed_upload)? {
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        match name.as_str() {
            "image" => {
                upload.declared_mime = field.content_type().map(|mime| mime.to_string());
                upload.image = Some(read_field(field, limits.max_bytes).await?);
            }
            "prompt" => {
                let bytes = read_field(field, MAX_PROMPT_BYTES).await?;
                let prompt = String::from_utf8(bytes)
                    .map_err(|_| ScanError::Input("The prompt must be UTF-8 text".to_string()))?;
                upload.prompt = Some(prompt);
            }
            _ => {
                read_field(field, limits.max_bytes).await?;
            }
        }
    }

    Ok(upload)
}

/// Buffers one field, failing as soon as it grows past `max_bytes`.
async fn read_field(mut field: Field, max_bytes: usize) -> ScanResult<Vec<u8>> {
    let limits = UploadLimits { max_bytes };
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(malformed_upload)?;
        check_size(data.len() + chunk.len(), &limits)?;
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

fn malformed_upload(e: actix_multipart::MultipartError) -> ScanError {
    ScanError::Input(format!("Malformed upload: {}", e))
}

async fn care_tips(
    identifier: web::Data<PlantIdentifier>,
    body: web::Json<CareTipsRequest>,
) -> HttpResponse {
    let scan_id = Uuid::new_v4();
    info!("Scan {}: care tips for {:?}", scan_id, body.plant_name);
    let result = identifier.care_tips(&body.plant_name).await;
    scan_response(scan_id, result)
}

/// Renders an unreadable care tips body as a tagged input failure.
fn care_tips_body_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let scan_id = Uuid::new_v4();
    let failure = ScanError::Input(format!("Invalid care tips request: {}", err));
    let response = scan_response::<()>(scan_id, Err(failure));
    InternalError::from_response(err, response).into()
}

fn scan_response<T: Serialize>(scan_id: Uuid, result: ScanResult<T>) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok()
            .insert_header((SCAN_ID_HEADER, scan_id.to_string()))
            .json(ScanOutcome::success(data)),
        Err(e) => {
            match &e {
                ScanError::Configuration(_) | ScanError::Service(_) => {
                    error!("Scan {} failed: {}", scan_id, e)
                }
                ScanError::Parse(_) | ScanError::Validation(_) => {
                    warn!("Scan {} returned an unusable answer: {}", scan_id, e)
                }
                ScanError::Input(_) => info!("Scan {} rejected: {}", scan_id, e),
            }
            let mut response = e.error_response();
            if let Ok(value) = HeaderValue::from_str(&scan_id.to_string()) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(SCAN_ID_HEADER_NAME), value);
            }
            response
        }
    }
}

async fn list_plants(
    directory: web::Data<PlantDirectory>,
    query: web::Query<PlantQuery>,
) -> HttpResponse {
    let plants = directory.search(&query);
    HttpResponse::Ok().json(plants)
}

async fn get_plant(directory: web::Data<PlantDirectory>, path: web::Path<u32>) -> HttpResponse {
    let id = path.into_inner();
    match directory.get(id) {
        Some(plant) => HttpResponse::Ok().json(plant),
        None => {
            info!("Plant not found: {}", id);
            HttpResponse::NotFound().json(ErrorResponse {
                error: format!("Plant {} not found", id),
            })
        }
    }
}

async fn list_regions(directory: web::Data<PlantDirectory>) -> HttpResponse {
    HttpResponse::Ok().json(directory.regions())
}

async fn conservation_statuses(query: web::Query<LocaleQuery>) -> HttpResponse {
    let locale = query
        .locale
        .as_deref()
        .and_then(|l| Locale::from_str(l.trim()).ok())
        .unwrap_or_default();
    HttpResponse::Ok().json(ConservationStatus::badges(locale))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::http::header::CONTENT_TYPE;
    use actix_web::{test, App};
    use serde_json::Value;

    use super::*;
    use crate::ai::testing::ScriptedClient;
    use crate::identify::{EndemicClassifier, EndemicKeywords};

    const BOUNDARY: &str = "----plantscan";
    const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    fn identifier(client: Arc<ScriptedClient>) -> PlantIdentifier {
        PlantIdentifier::new(
            client,
            EndemicClassifier::new(EndemicKeywords::builtin().unwrap()),
        )
    }

    fn part(name: &str, content_type: Option<&str>, content: &[u8]) -> Vec<u8> {
        let mut body = format!("--{}\r\n", BOUNDARY).into_bytes();
        match content_type {
            Some(mime) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"upload\"\r\n\
                     Content-Type: {}\r\n\r\n",
                    name, mime
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
        body
    }

    fn multipart(parts: Vec<Vec<u8>>) -> Vec<u8> {
        let mut body: Vec<u8> = parts.into_iter().flatten().collect();
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn identify_request(body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/identify")
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
    }

    macro_rules! app {
        ($client:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(identifier($client)))
                    .app_data(web::Data::new(PlantDirectory::builtin().unwrap()))
                    .app_data(web::Data::new(UploadLimits { max_bytes: 1024 }))
                    .configure(|cfg| configure_routes(cfg, None)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn identify_returns_a_tagged_success() {
        let client = Arc::new(ScriptedClient::replying(
            r#"{"name":"Bunga Bangkai","scientificName":"Amorphophallus titanum","confidence":"88"}"#,
        ));
        let app = app!(client.clone());

        let body = multipart(vec![
            part("image", Some("image/jpeg"), JPEG_BYTES),
            part("prompt", None, b"Perhatikan bunganya."),
        ]);
        let resp = test::call_service(&app, identify_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(SCAN_ID_HEADER));

        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["scientificName"], "Amorphophallus titanum");
        assert_eq!(json["data"]["confidence"], 88);
        assert_eq!(json["data"]["endemicStatus"], "endemic");

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.starts_with("Perhatikan bunganya."));
    }

    #[actix_web::test]
    async fn unsupported_type_never_reaches_the_client() {
        let client = Arc::new(ScriptedClient::default());
        let app = app!(client.clone());

        let body = multipart(vec![part("image", Some("image/gif"), b"GIF89a\x01\x00")]);
        let resp = test::call_service(&app, identify_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "input");
        assert!(client.calls().is_empty());
    }

    #[actix_web::test]
    async fn oversized_upload_is_rejected() {
        let client = Arc::new(ScriptedClient::default());
        let app = app!(client.clone());

        let mut big = JPEG_BYTES.to_vec();
        big.resize(2048, 0);
        let body = multipart(vec![part("image", Some("image/jpeg"), &big)]);
        let resp = test::call_service(&app, identify_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(client.calls().is_empty());
    }

    #[actix_web::test]
    async fn missing_image_is_an_input_failure() {
        let client = Arc::new(ScriptedClient::default());
        let app = app!(client.clone());

        let body = multipart(vec![part("prompt", None, b"halo")]);
        let resp = test::call_service(&app, identify_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(client.calls().is_empty());
    }

    #[actix_web::test]
    async fn unusable_answer_maps_to_bad_gateway() {
        let client = Arc::new(ScriptedClient::replying("Maaf, gambar tidak jelas."));
        let app = app!(client);

        let body = multipart(vec![part("image", Some("image/jpeg"), JPEG_BYTES)]);
        let resp = test::call_service(&app, identify_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert!(resp.headers().contains_key(SCAN_ID_HEADER));

        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["kind"], "parse");
        assert_eq!(
            json["message"],
            "Invalid response format from the AI service, please try again."
        );
    }

    #[actix_web::test]
    async fn missing_api_key_maps_to_service_unavailable() {
        let client = Arc::new(ScriptedClient::failing(ScanError::Configuration(
            "GEMINI_API_KEY is not set".to_string(),
        )));
        let app = app!(client);

        let req = test::TestRequest::post()
            .uri("/api/care-tips")
            .set_json(json!({ "plantName": "Aloe vera" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["kind"], "configuration");
    }

    #[actix_web::test]
    async fn care_tips_without_plant_name_is_an_input_failure() {
        let client = Arc::new(ScriptedClient::default());
        let app = app!(client.clone());

        let req = test::TestRequest::post()
            .uri("/api/care-tips")
            .set_json(json!({ "name": "Aloe" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(resp.headers().contains_key(SCAN_ID_HEADER));

        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "input");
        assert!(client.calls().is_empty());
    }

    #[actix_web::test]
    async fn care_tips_with_non_json_body_is_an_input_failure() {
        let app = app!(Arc::new(ScriptedClient::default()));

        let req = test::TestRequest::post()
            .uri("/api/care-tips")
            .insert_header((CONTENT_TYPE, "application/json"))
            .set_payload("plantName=Aloe")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["kind"], "input");
    }

    #[actix_web::test]
    async fn care_tips_success() {
        let client = Arc::new(ScriptedClient::replying(
            r#"{"watering":"Seminggu sekali","sunlight":"Penuh","soil":"Berpasir","temperature":"25°C"}"#,
        ));
        let app = app!(client);

        let req = test::TestRequest::post()
            .uri("/api/care-tips")
            .set_json(json!({ "plantName": "Lidah Buaya" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["data"]["watering"], "Seminggu sekali");
    }

    #[actix_web::test]
    async fn plant_search_and_lookup() {
        let app = app!(Arc::new(ScriptedClient::default()));

        let req = test::TestRequest::get()
            .uri("/api/plants?q=rafflesia")
            .to_request();
        let plants: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0]["conservationStatus"], "CR");

        let req = test::TestRequest::get().uri("/api/plants/1").to_request();
        let plant: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(plant["name"], "Padma Raksasa");

        let req = test::TestRequest::get().uri("/api/plants/424242").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn regions_are_listed_once() {
        let app = app!(Arc::new(ScriptedClient::default()));
        let req = test::TestRequest::get().uri("/api/regions").to_request();
        let regions: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert!(regions.contains(&"Kalimantan".to_string()));
        assert_eq!(regions.iter().filter(|r| *r == "Sumatra").count(), 1);
    }

    #[actix_web::test]
    async fn conservation_badges_follow_locale() {
        let app = app!(Arc::new(ScriptedClient::default()));

        let req = test::TestRequest::get()
            .uri("/api/conservation-statuses?locale=en")
            .to_request();
        let badges: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(badges.len(), 5);
        assert_eq!(badges[4]["code"], "CR");
        assert_eq!(badges[4]["label"], "Critically Endangered");
        assert_eq!(badges[4]["color"], "red");

        let req = test::TestRequest::get()
            .uri("/api/conservation-statuses?locale=xx")
            .to_request();
        let badges: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(badges[0]["label"], "Risiko Rendah");
    }

    #[actix_web::test]
    async fn health_check() {
        let app = app!(Arc::new(ScriptedClient::default()));
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }
}
