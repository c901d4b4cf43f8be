//! 闪存消息：通过 Cookie 在重定向之间传递一次性提示

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpRequest, HttpResponse, http::header};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::models::FlashMessage;

pub const FLASH_COOKIE: &str = "flash";

/// 写入闪存消息的 Cookie
pub fn flash_cookie(message: &FlashMessage) -> Cookie<'static> {
    let payload = serde_json::to_string(message).unwrap_or_default();
    Cookie::build(FLASH_COOKIE, encode_cookie_value(&payload))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(5))
        .finish()
}

/// 读取后用于清除的空 Cookie
pub fn clear_flash_cookie() -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE, "")
        .path("/")
        .max_age(Duration::seconds(0))
        .finish()
}

/// 读取请求中的闪存消息，格式错误时忽略
pub fn read_flash(req: &HttpRequest) -> Option<FlashMessage> {
    let cookie = req.cookie(FLASH_COOKIE)?;
    let payload = decode_cookie_value(cookie.value())?;
    serde_json::from_str(&payload).ok()
}

/// 303 重定向并附带闪存消息
pub fn redirect_with_flash(location: &str, message: FlashMessage) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .cookie(flash_cookie(&message))
        .finish()
}

/// 不带消息的 303 重定向
pub fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

// Cookie 值不能包含引号、逗号、分号等字符，使用 URL 安全的 Base64
fn encode_cookie_value(raw: &str) -> String {
    URL_SAFE_NO_PAD.encode(raw)
}

fn decode_cookie_value(encoded: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FlashLevel;
    use actix_web::test::TestRequest;

    #[test]
    fn test_flash_cookie_is_readable() {
        let message = FlashMessage::info("You are already enrolled in this course.");
        let cookie = flash_cookie(&message);
        let req = TestRequest::default()
            .cookie(Cookie::new(FLASH_COOKIE, cookie.value().to_string()))
            .to_http_request();

        assert!(
            cookie
                .value()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );

        let read = read_flash(&req).unwrap();
        assert_eq!(read.level, FlashLevel::Info);
        assert_eq!(read, message);
    }

    #[test]
    fn test_garbage_flash_is_ignored() {
        let req = TestRequest::default()
            .cookie(Cookie::new(FLASH_COOKIE, "!!not-encoded"))
            .to_http_request();
        assert!(read_flash(&req).is_none());
        assert!(read_flash(&TestRequest::default().to_http_request()).is_none());
    }

    #[test]
    fn test_redirect_sets_location_and_cookie() {
        let response = redirect_with_flash("/student/dashboard", FlashMessage::success("ok"));
        assert_eq!(response.status(), actix_web::http::StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/student/dashboard"
        );
        assert!(response.cookies().any(|c| c.name() == FLASH_COOKIE));
    }
}
