// Tue Feb 03 2026 - Alex

use crate::engine::stage::StageParams;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParamError {
    #[error("Expected name=value, got '{0}'")]
    Malformed(String),

    #[error("Parameter '{name}' has invalid value '{value}': {reason}")]
    InvalidValue { name: String, value: String, reason: String },
}

/// Parses `name=value`. Names are normalized to snake_case so `image-size`
/// and `image_size` are the same parameter.
pub fn parse_param(s: &str) -> Result<(String, String), ParamError> {
    let (name, value) = s.split_once('=').ok_or_else(|| ParamError::Malformed(s.to_string()))?;
    let name = name.trim().replace('-', "_");
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ParamError::Malformed(s.to_string()));
    }
    Ok((name, value.trim().to_string()))
}

/// Accepts `2048`, `2048x1024`, `2048X1024`, `2048,1024` or `2048 1024`.
pub fn parse_size(s: &str) -> Option<(u32, u32)> {
    let s = s.trim();
    for sep in ['x', 'X', ',', ' '] {
        if let Some((w, h)) = s.split_once(sep) {
            let w = w.trim().parse().ok()?;
            let h = h.trim().parse().ok()?;
            return Some((w, h));
        }
    }
    let v = s.parse().ok()?;
    Some((v, v))
}

/// Layers `overrides` on top of `defaults`, keeping defaults' order first.
pub fn merge_params(defaults: &[(&str, &str)], overrides: &[(String, String)]) -> StageParams {
    let mut params: StageParams = defaults
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    for (k, v) in overrides {
        params.insert(k.clone(), v.clone());
    }
    params
}

fn invalid(name: &str, value: &str, reason: &str) -> ParamError {
    ParamError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive_float(params: &StageParams, name: &str) -> Result<(), ParamError> {
    if let Some(value) = params.get(name) {
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => {}
            _ => return Err(invalid(name, value, "expected a positive number")),
        }
    }
    Ok(())
}

/// Checks the render stage's camera and lighting parameters before any item runs.
pub fn validate_render_params(params: &StageParams) -> Result<(), ParamError> {
    positive_float(params, "radius")?;
    positive_float(params, "light_intensity")?;

    if let Some(value) = params.get("num_env_lights") {
        value
            .parse::<u32>()
            .map_err(|_| invalid("num_env_lights", value, "expected a non-negative integer"))?;
    }

    if let Some(value) = params.get("image_size") {
        match parse_size(value) {
            Some((w, h)) if w > 0 && h > 0 => {}
            _ => return Err(invalid("image_size", value, "expected W, WxH, W,H or 'W H'")),
        }
    }
    Ok(())
}
