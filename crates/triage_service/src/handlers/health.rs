use actix_web::{get, HttpRequest, HttpResponse, Responder};

#[get("/health")]
pub async fn health(_: HttpRequest) -> impl Responder {
    HttpResponse::Ok().json("healthy")
}
