use validator::ValidationError;

/// 自然语言请求的最大长度（字符数）
pub const MAX_QUERY_CHARS: usize = 2000;

/// 验证自然语言请求
pub fn validate_query(query: &str) -> Result<(), ValidationError> {
    if query.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("query不能为空".into()));
    }

    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(ValidationError::new("too_long")
            .with_message(format!("query长度不能超过{}个字符", MAX_QUERY_CHARS).into()));
    }

    if query.chars().any(|c| c.is_control() && !c.is_whitespace()) {
        return Err(ValidationError::new("control_chars").with_message("query包含非法控制字符".into()));
    }

    Ok(())
}

/// 验证交易状态过滤条件
pub fn validate_state_filter(state: &str) -> Result<(), ValidationError> {
    if state.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("state不能为空".into()));
    }

    if !state
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ValidationError::new("invalid_state").with_message("state格式无效".into()));
    }

    Ok(())
}
