use actix_web::HttpResponse;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

pub async fn ready() -> HttpResponse {
    HttpResponse::Ok().body("READY")
}
