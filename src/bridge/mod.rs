//! FFI bridge: C-ABI entry points for a host engine.
//!
//! A player session is an opaque `PlayerFeedback` handle created with
//! `feedback_player_create` and released with `feedback_player_destroy`.
//! Structured data crosses the boundary as JSON. Every `*mut c_char` returned
//! here is heap-allocated and must be released with `free_string`.
//!
//! Null handles and malformed JSON never panic: pointer-returning calls give
//! null, numeric calls give -1 and boolean calls give false.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use tracing::{debug, error, info, trace, warn};

use crate::collaborators::FrameMovement;
use crate::config::FeedbackCoreConfig;
use crate::feedback::FeedbackFrame;
use crate::logging::{self, LogLevel, TracingConfig};
use crate::player::PlayerFeedback;
use crate::vitals::{DamageEvent, DamageType, Vitals, VitalsEvent};

// ========================
// Data transfer types
// ========================

/// Resolved hit sent by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageRequest {
    pub amount: f32,
    #[serde(default)]
    pub damage_type: DamageType,
    #[serde(default)]
    pub hit_point: [f32; 3],
    #[serde(default)]
    pub hit_direction: [f32; 3],
    #[serde(default)]
    pub knockback: f32,
}

impl From<DamageRequest> for DamageEvent {
    fn from(request: DamageRequest) -> Self {
        DamageEvent::new(request.amount, request.damage_type)
            .with_hit(
                Vec3::from_array(request.hit_point),
                Vec3::from_array(request.hit_direction),
            )
            .with_knockback(request.knockback)
    }
}

/// Everything a host needs after one `feedback_tick`
#[derive(Debug, Serialize)]
pub struct TickResponse {
    pub movement: FrameMovement,
    pub frame: FeedbackFrame,
    pub vitals: Vitals,
    pub health_percent: f32,
    pub armor_percent: f32,
    pub flash_visible: bool,
    pub events: Vec<VitalsEvent>,
}

// ========================
// Helpers
// ========================

fn json_to_cstring<T: Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn parse_cstr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_owned()) }
}

fn handle<'a>(ptr: *mut PlayerFeedback) -> Option<&'a mut PlayerFeedback> {
    // Non-null handles come from `feedback_player_create` and stay valid until destroyed
    unsafe { ptr.as_mut() }
}

// ========================
// C-ABI: Core
// ========================

#[no_mangle]
pub extern "C" fn feedback_version() -> *mut c_char {
    CString::new(env!("CARGO_PKG_VERSION"))
        .unwrap_or_default()
        .into_raw()
}

/// Free a string allocated by Rust. `ptr` must come from this bridge or be null.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            drop(CString::from_raw(ptr));
        }
    }
}

/// Default tuning as JSON, for hosts that want to edit and send it back
#[no_mangle]
pub extern "C" fn feedback_default_config() -> *mut c_char {
    json_to_cstring(&FeedbackCoreConfig::default())
}

// ========================
// C-ABI: Logging
// ========================

/// Default logging configuration as JSON
#[no_mangle]
pub extern "C" fn feedback_logging_default_config() -> *mut c_char {
    CString::new(TracingConfig::default().to_json())
        .unwrap_or_default()
        .into_raw()
}

/// Install the tracing subscriber. Null means defaults; malformed JSON
/// returns false. Only the first successful call takes effect.
#[no_mangle]
pub extern "C" fn feedback_logging_init(config_json: *const c_char) -> bool {
    if config_json.is_null() {
        logging::init_tracing_default();
        return true;
    }
    match parse_cstr(config_json).and_then(|json| TracingConfig::from_json(&json)) {
        Some(config) => {
            logging::init_tracing(&config);
            true
        }
        None => false,
    }
}

/// Forward a host message into the log (0=Trace, 1=Debug, 2=Info, 3=Warn, 4=Error)
#[no_mangle]
pub extern "C" fn feedback_log_message(level: u32, message: *const c_char) -> bool {
    let Some(message) = parse_cstr(message) else {
        return false;
    };
    match LogLevel::from_id(level) {
        LogLevel::Trace => trace!(target: "feedback_core::host", "{}", message),
        LogLevel::Debug => debug!(target: "feedback_core::host", "{}", message),
        LogLevel::Info => info!(target: "feedback_core::host", "{}", message),
        LogLevel::Warn => warn!(target: "feedback_core::host", "{}", message),
        LogLevel::Error => error!(target: "feedback_core::host", "{}", message),
    }
    true
}

// ========================
// C-ABI: Session lifecycle
// ========================

/// Create a player session. Null config means defaults; an invalid config
/// returns null.
#[no_mangle]
pub extern "C" fn feedback_player_create(config_json: *const c_char) -> *mut PlayerFeedback {
    let config = if config_json.is_null() {
        FeedbackCoreConfig::default()
    } else {
        let Some(text) = parse_cstr(config_json) else {
            return std::ptr::null_mut();
        };
        match FeedbackCoreConfig::from_json_str(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!("Rejected player config: {}", e);
                return std::ptr::null_mut();
            }
        }
    };
    Box::into_raw(Box::new(PlayerFeedback::new(config)))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn feedback_player_destroy(player: *mut PlayerFeedback) {
    if !player.is_null() {
        unsafe {
            drop(Box::from_raw(player));
        }
    }
}

/// Replace the session tuning. Returns false on a null handle or bad config.
#[no_mangle]
pub extern "C" fn feedback_set_config(player: *mut PlayerFeedback, config_json: *const c_char) -> bool {
    let Some(player) = handle(player) else {
        return false;
    };
    let Some(text) = parse_cstr(config_json) else {
        return false;
    };
    match FeedbackCoreConfig::from_json_str(&text) {
        Ok(config) => {
            player.set_config(config);
            true
        }
        Err(e) => {
            warn!("Rejected player config: {}", e);
            false
        }
    }
}

// ========================
// C-ABI: Vitals
// ========================

/// Apply a `DamageRequest` JSON; returns the `DamageOutcome` as JSON.
#[no_mangle]
pub extern "C" fn feedback_apply_damage(
    player: *mut PlayerFeedback,
    request_json: *const c_char,
) -> *mut c_char {
    let Some(player) = handle(player) else {
        return std::ptr::null_mut();
    };
    let Some(text) = parse_cstr(request_json) else {
        return std::ptr::null_mut();
    };
    let request: DamageRequest = match serde_json::from_str(&text) {
        Ok(r) => r,
        Err(_) => return std::ptr::null_mut(),
    };
    let outcome = player.apply_damage(&request.into());
    json_to_cstring(&outcome)
}

/// Returns the health actually restored, or -1 on a null handle.
#[no_mangle]
pub extern "C" fn feedback_heal(player: *mut PlayerFeedback, amount: f32) -> f32 {
    handle(player).map_or(-1.0, |p| p.heal(amount))
}

/// Returns the armor actually added, or -1 on a null handle.
#[no_mangle]
pub extern "C" fn feedback_add_armor(player: *mut PlayerFeedback, amount: f32) -> f32 {
    handle(player).map_or(-1.0, |p| p.add_armor(amount))
}

/// Respawn at `(x, y, z)`. The host performs the teleport itself.
#[no_mangle]
pub extern "C" fn feedback_respawn(player: *mut PlayerFeedback, x: f32, y: f32, z: f32) -> bool {
    let Some(player) = handle(player) else {
        return false;
    };
    let mut movement = FrameMovement::default();
    player.respawn(Vec3::new(x, y, z), &mut movement)
}

#[no_mangle]
pub extern "C" fn feedback_health_percent(player: *mut PlayerFeedback) -> f32 {
    handle(player).map_or(-1.0, |p| p.health_percent())
}

#[no_mangle]
pub extern "C" fn feedback_armor_percent(player: *mut PlayerFeedback) -> f32 {
    handle(player).map_or(-1.0, |p| p.armor_percent())
}

#[no_mangle]
pub extern "C" fn feedback_is_dead(player: *mut PlayerFeedback) -> bool {
    handle(player).is_some_and(|p| p.is_dead())
}

#[no_mangle]
pub extern "C" fn feedback_vitals(player: *mut PlayerFeedback) -> *mut c_char {
    match handle(player) {
        Some(p) => json_to_cstring(&p.vitals().vitals()),
        None => std::ptr::null_mut(),
    }
}

// ========================
// C-ABI: Feedback signals
// ========================

#[no_mangle]
pub extern "C" fn feedback_trigger_shake(player: *mut PlayerFeedback, strength: f32) -> bool {
    handle(player).map(|p| p.trigger_shake(strength)).is_some()
}

#[no_mangle]
pub extern "C" fn feedback_trigger_vignette(player: *mut PlayerFeedback, strength: f32) -> bool {
    handle(player).map(|p| p.trigger_vignette(strength)).is_some()
}

#[no_mangle]
pub extern "C" fn feedback_trigger_chromatic(player: *mut PlayerFeedback, strength: f32) -> bool {
    handle(player)
        .map(|p| p.trigger_chromatic_aberration(strength))
        .is_some()
}

/// Returns true only when the knockback was accepted.
#[no_mangle]
pub extern "C" fn feedback_trigger_knockback(
    player: *mut PlayerFeedback,
    dir_x: f32,
    dir_y: f32,
    dir_z: f32,
    magnitude: f32,
) -> bool {
    handle(player).is_some_and(|p| p.trigger_knockback(Vec3::new(dir_x, dir_y, dir_z), magnitude))
}

/// Advance one frame and return a `TickResponse` JSON. Events are drained.
#[no_mangle]
pub extern "C" fn feedback_tick(player: *mut PlayerFeedback, dt: f32) -> *mut c_char {
    let Some(player) = handle(player) else {
        return std::ptr::null_mut();
    };
    let mut movement = FrameMovement::default();
    player.tick(dt, &mut movement);
    let response = TickResponse {
        movement,
        frame: player.sample(),
        vitals: player.vitals().vitals(),
        health_percent: player.health_percent(),
        armor_percent: player.armor_percent(),
        flash_visible: player.vitals().is_flash_visible(),
        events: player.drain_events(),
    };
    json_to_cstring(&response)
}

/// Presentation sample without advancing time
#[no_mangle]
pub extern "C" fn feedback_sample(player: *mut PlayerFeedback) -> *mut c_char {
    match handle(player) {
        Some(p) => json_to_cstring(&p.sample()),
        None => std::ptr::null_mut(),
    }
}
