use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::errors::Result;
use crate::models::certificates::entities::CertificateIssuance;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::api_error_response;

use super::{LearningService, current_user_id, load_owned_enrollment};

/// 为已完成的选课签发证书；重复请求返回同一张证书
pub async fn handle_issue_certificate(
    service: &LearningService,
    request: &HttpRequest,
    enrollment_id: i64,
) -> ActixResult<HttpResponse> {
    match issue_certificate(service, request, enrollment_id).await {
        Ok(CertificateIssuance::Issued(certificate)) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(certificate, "Certificate issued"))),
        Ok(CertificateIssuance::AlreadyIssued(certificate)) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(certificate, "Certificate already issued"),
        )),
        Ok(CertificateIssuance::NotEligible) => Ok(HttpResponse::UnprocessableEntity().json(
            ApiResponse::error_empty(
                ErrorCode::CertificateNotEligible,
                "The course has not been completed yet",
            ),
        )),
        Err(e) => Ok(api_error_response(&e)),
    }
}

async fn issue_certificate(
    service: &LearningService,
    request: &HttpRequest,
    enrollment_id: i64,
) -> Result<CertificateIssuance> {
    let storage = service.get_storage(request);
    let user_id = current_user_id(request)?;
    load_owned_enrollment(&storage, enrollment_id, user_id).await?;
    storage.issue_certificate_if_eligible(enrollment_id).await
}
