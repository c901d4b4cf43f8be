use sea_orm::sea_query::LikeExpr;

/// LIKE 模式使用的转义字符
pub const LIKE_ESCAPE: char = '\\';

/// 转义 LIKE 通配符，使用户输入按字面匹配
pub fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// 构造大小写不敏感的子串匹配（调用方需对列值做同样的小写化）
pub fn contains_ignore_case(needle: &str) -> LikeExpr {
    let escaped = escape_like_pattern(&needle.to_lowercase());
    LikeExpr::new(format!("%{escaped}%")).escape(LIKE_ESCAPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_wildcards() {
        assert_eq!(escape_like_pattern("100%"), "100\\%");
        assert_eq!(escape_like_pattern("snake_case"), "snake\\_case");
        assert_eq!(escape_like_pattern("a\\b"), "a\\\\b");
        assert_eq!(escape_like_pattern("python"), "python");
    }
}
