//! MCP (Model Context Protocol) server for the Combat School board.
//!
//! Exposes the board as a JSON-RPC 2.0 server over stdin/stdout. CPU cores
//! are supplied by the host, so the server drives the board directly: tools
//! load sets, poke either bus, flip inputs and DIPs, and move save states
//! in and out as base64.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use emu_core::{Bus, Observable, Stateful, parse_address};

use crate::board::Board;
use crate::config::{CombatSchoolConfig, Variant};
use crate::input::{Button, TrackballAxis};
use crate::romset::{self, DirectorySource, MemorySource, RomSource};
use crate::snapshot::BoardSnapshot;
use crate::video::LayerDirty;

// ---------------------------------------------------------------------------
// JSON-RPC types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RpcRequest {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: JsonValue,
    id: JsonValue,
}

#[derive(Serialize)]
struct RpcResponse {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
    id: JsonValue,
}

#[derive(Serialize)]
struct RpcError {
    code: i32,
    message: String,
}

impl RpcResponse {
    fn success(id: JsonValue, result: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0",
            result: Some(result),
            error: None,
            id,
        }
    }

    fn error(id: JsonValue, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            result: None,
            error: Some(RpcError { code, message }),
            id,
        }
    }
}

// ---------------------------------------------------------------------------
// MCP Server
// ---------------------------------------------------------------------------

/// MCP server wrapping a headless board.
pub struct McpServer {
    board: Option<Board>,
    rom_dir: Option<PathBuf>,
}

impl McpServer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: None,
            rom_dir: None,
        }
    }

    /// Set a default ROM directory (from CLI --rom-dir argument).
    pub fn set_rom_dir(&mut self, path: PathBuf) {
        self.rom_dir = Some(path);
    }

    /// Serve an already-built board.
    pub fn set_board(&mut self, board: Board) {
        self.board = Some(board);
    }

    /// Run the server loop: read JSON-RPC from stdin, write responses to stdout.
    pub fn run(&mut self) {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut stdout = stdout.lock();

        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = self.handle_line(line);
            let _ = writeln!(
                stdout,
                "{}",
                serde_json::to_string(&response).unwrap_or_default()
            );
            let _ = stdout.flush();
        }
    }

    fn handle_line(&mut self, line: &str) -> RpcResponse {
        let request: RpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                return RpcResponse::error(JsonValue::Null, -32700, format!("Parse error: {e}"));
            }
        };
        if request.jsonrpc != "2.0" {
            return RpcResponse::error(request.id, -32600, "Invalid JSON-RPC version".to_string());
        }
        self.dispatch(&request.method, &request.params, request.id)
    }

    fn dispatch(&mut self, method: &str, params: &JsonValue, id: JsonValue) -> RpcResponse {
        match method {
            "boot" => self.handle_boot(params, id),
            "reset" => self.handle_reset(id),
            "list_sets" => handle_list_sets(id),
            "verify_roms" => self.handle_verify_roms(params, id),
            "read" => self.handle_read(params, id),
            "write" => self.handle_write(params, id),
            "query" => self.handle_query(params, id),
            "press_button" => self.handle_button(params, id, true),
            "release_button" => self.handle_button(params, id, false),
            "set_trackball" => self.handle_set_trackball(params, id),
            "set_dip" => self.handle_set_dip(params, id),
            "take_dirty" => self.handle_take_dirty(id),
            "snapshot" => self.handle_snapshot(id),
            "restore" => self.handle_restore(params, id),
            _ => RpcResponse::error(id, -32601, format!("Unknown method: {method}")),
        }
    }

    fn require_board(&mut self, id: &JsonValue) -> Result<&mut Board, RpcResponse> {
        self.board.as_mut().ok_or_else(|| {
            RpcResponse::error(
                id.clone(),
                -32000,
                "No board. Call 'boot' first.".to_string(),
            )
        })
    }

    /// ROM source from `files` (name → base64), `rom_dir`, or the CLI default.
    fn rom_source(&self, params: &JsonValue) -> Result<Box<dyn RomSource>, String> {
        if let Some(files) = params.get("files").and_then(|v| v.as_object()) {
            let mut source = MemorySource::new();
            for (name, data) in files {
                let b64 = data
                    .as_str()
                    .ok_or_else(|| format!("File '{name}' is not a base64 string"))?;
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(b64)
                    .map_err(|e| format!("Invalid base64 for '{name}': {e}"))?;
                source.insert(name.clone(), bytes);
            }
            return Ok(Box::new(source));
        }
        let dir = params
            .get("rom_dir")
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
            .or_else(|| self.rom_dir.clone())
            .ok_or_else(|| "Provide 'files', 'rom_dir', or --rom-dir CLI argument".to_string())?;
        DirectorySource::new(dir)
            .map(|s| Box::new(s) as Box<dyn RomSource>)
            .map_err(|e| e.to_string())
    }

    // === Tool handlers ===

    fn handle_boot(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let variant = match require_variant(params) {
            Ok(v) => v,
            Err(msg) => return RpcResponse::error(id, -32602, msg),
        };
        let source = match self.rom_source(params) {
            Ok(s) => s,
            Err(msg) => return RpcResponse::error(id, -32602, msg),
        };

        let mut config = CombatSchoolConfig::new(variant);
        config.strict_roms = params
            .get("strict")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if let Some(dips) = params.get("dips").and_then(|v| v.as_object()) {
            for (name, setting) in dips {
                if let Some(setting) = setting.as_str() {
                    config.dips.push((name.clone(), setting.to_string()));
                }
            }
        }

        match Board::load(&config, source.as_ref()) {
            Ok(board) => {
                let result = serde_json::json!({
                    "set": variant.name(),
                    "degraded": board.degraded(),
                    "issues": board.rom_report().issues.len(),
                });
                self.board = Some(board);
                RpcResponse::success(id, result)
            }
            Err(e) => RpcResponse::error(id, -32000, format!("Boot failed: {e}")),
        }
    }

    fn handle_reset(&mut self, id: JsonValue) -> RpcResponse {
        match self.require_board(&id) {
            Ok(board) => {
                board.reset();
                RpcResponse::success(id, serde_json::json!({"status": "ok"}))
            }
            Err(e) => e,
        }
    }

    fn handle_verify_roms(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let variant = match require_variant(params) {
            Ok(v) => v,
            Err(msg) => return RpcResponse::error(id, -32602, msg),
        };
        let source = match self.rom_source(params) {
            Ok(s) => s,
            Err(msg) => return RpcResponse::error(id, -32602, msg),
        };
        let report = romset::verify(variant, source.as_ref());
        match serde_json::to_value(&report) {
            Ok(mut value) => {
                value["degraded"] = JsonValue::Bool(report.degraded());
                RpcResponse::success(id, value)
            }
            Err(e) => RpcResponse::error(id, -32000, format!("Encode error: {e}")),
        }
    }

    /// Side-effect-free read of `length` bytes from either bus.
    fn handle_read(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let audio = is_audio(params);
        let board = match self.require_board(&id) {
            Ok(b) => b,
            Err(e) => return e,
        };
        let Some(address) = param_address(params) else {
            return RpcResponse::error(id, -32602, "Missing or invalid 'address'".to_string());
        };
        let length = match params.get("length").and_then(|v| v.as_u64()) {
            None => 1,
            Some(l) if (1..=0x10000).contains(&l) => l as usize,
            Some(_) => {
                return RpcResponse::error(id, -32602, "Invalid 'length' (1-65536)".to_string());
            }
        };

        let bytes: Vec<u8> = (0..length)
            .map(|i| {
                let addr = address.wrapping_add(i as u16);
                if audio {
                    crate::bus::SoundBus::peek(board, addr)
                } else {
                    crate::bus::MainBus::peek(board, addr)
                }
            })
            .collect();

        RpcResponse::success(
            id,
            serde_json::json!({
                "address": address,
                "length": length,
                "data": bytes,
            }),
        )
    }

    /// Bus write with full side effects, as the CPU would perform it.
    fn handle_write(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let audio = is_audio(params);
        let board = match self.require_board(&id) {
            Ok(b) => b,
            Err(e) => return e,
        };
        let Some(address) = param_address(params) else {
            return RpcResponse::error(id, -32602, "Missing or invalid 'address'".to_string());
        };
        let value = match params.get("value").and_then(|v| v.as_u64()) {
            Some(v) if v <= 0xFF => v as u8,
            _ => return RpcResponse::error(id, -32602, "Invalid 'value' (0-255)".to_string()),
        };

        if audio {
            board.sound_bus().write(address, value);
        } else {
            board.main_bus().write(address, value);
        }
        RpcResponse::success(id, serde_json::json!({"address": address, "value": value}))
    }

    fn handle_query(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let board = match self.require_board(&id) {
            Ok(b) => b,
            Err(e) => return e,
        };
        let Some(path) = params.get("path").and_then(|v| v.as_str()) else {
            return RpcResponse::error(id, -32602, "Missing 'path' parameter".to_string());
        };

        match board.query(path) {
            Some(value) => {
                let json_val = serde_json::to_value(&value).unwrap_or(JsonValue::Null);
                RpcResponse::success(id, serde_json::json!({"path": path, "value": json_val}))
            }
            None => RpcResponse::error(id, -32000, format!("Unknown query path: {path}")),
        }
    }

    fn handle_button(&mut self, params: &JsonValue, id: JsonValue, pressed: bool) -> RpcResponse {
        let board = match self.require_board(&id) {
            Ok(b) => b,
            Err(e) => return e,
        };
        let Some(name) = params.get("button").and_then(|v| v.as_str()) else {
            return RpcResponse::error(id, -32602, "Missing 'button' parameter".to_string());
        };
        let Some(button) = Button::from_name(name) else {
            return RpcResponse::error(id, -32602, format!("Unknown button: {name}"));
        };
        if !board.input.set_button(button, pressed) {
            return RpcResponse::error(
                id,
                -32000,
                format!("Button {name} is not wired on {}", board.variant()),
            );
        }
        RpcResponse::success(id, serde_json::json!({"button": name, "pressed": pressed}))
    }

    fn handle_set_trackball(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let board = match self.require_board(&id) {
            Ok(b) => b,
            Err(e) => return e,
        };
        let Some(axis) = params
            .get("axis")
            .and_then(|v| v.as_str())
            .and_then(TrackballAxis::from_name)
        else {
            return RpcResponse::error(
                id,
                -32602,
                "Invalid 'axis' (p1_y, p1_x, p2_y, p2_x)".to_string(),
            );
        };
        let value = match params.get("value").and_then(|v| v.as_u64()) {
            Some(v) if v <= 0xFF => v as u8,
            _ => return RpcResponse::error(id, -32602, "Invalid 'value' (0-255)".to_string()),
        };
        board.input.set_trackball(axis, value);
        RpcResponse::success(id, serde_json::json!({"status": "ok"}))
    }

    fn handle_set_dip(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let board = match self.require_board(&id) {
            Ok(b) => b,
            Err(e) => return e,
        };
        let (Some(name), Some(setting)) = (
            params.get("name").and_then(|v| v.as_str()),
            params.get("setting").and_then(|v| v.as_str()),
        ) else {
            return RpcResponse::error(id, -32602, "Provide 'name' and 'setting'".to_string());
        };
        match board.input.dips.set(name, setting) {
            Ok(()) => RpcResponse::success(id, serde_json::json!({"name": name, "setting": setting})),
            Err(e) => RpcResponse::error(id, -32602, e.to_string()),
        }
    }

    fn handle_take_dirty(&mut self, id: JsonValue) -> RpcResponse {
        let board = match self.require_board(&id) {
            Ok(b) => b,
            Err(e) => return e,
        };
        let dirty = board.video.take_dirty();
        RpcResponse::success(
            id,
            serde_json::json!({
                "text": layer_json(&dirty.text),
                "tilemap0": layer_json(&dirty.tilemap0),
                "tilemap1": layer_json(&dirty.tilemap1),
            }),
        )
    }

    fn handle_snapshot(&mut self, id: JsonValue) -> RpcResponse {
        let board = match self.require_board(&id) {
            Ok(b) => b,
            Err(e) => return e,
        };
        let bytes = board.snapshot().to_bytes();
        let b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
        RpcResponse::success(id, serde_json::json!({"size": bytes.len(), "data": b64}))
    }

    fn handle_restore(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let board = match self.require_board(&id) {
            Ok(b) => b,
            Err(e) => return e,
        };
        let Some(b64) = params.get("data").and_then(|v| v.as_str()) else {
            return RpcResponse::error(id, -32602, "Missing 'data' parameter".to_string());
        };
        let bytes = match base64::engine::general_purpose::STANDARD.decode(b64) {
            Ok(d) => d,
            Err(e) => return RpcResponse::error(id, -32602, format!("Invalid base64: {e}")),
        };
        let result = BoardSnapshot::from_bytes(&bytes).and_then(|snap| snap.restore_into(board));
        match result {
            Ok(()) => RpcResponse::success(id, serde_json::json!({"status": "ok"})),
            Err(e) => RpcResponse::error(id, -32000, format!("Restore failed: {e}")),
        }
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn handle_list_sets(id: JsonValue) -> RpcResponse {
    let sets: Vec<JsonValue> = Variant::ALL
        .into_iter()
        .map(|v| {
            serde_json::json!({
                "name": v.name(),
                "description": v.description(),
                "year": v.year(),
                "manufacturer": v.manufacturer(),
                "parent": v.parent().map(Variant::name),
                "board": v.board(),
                "controls": v.controls(),
                "status": v.status(),
            })
        })
        .collect();
    RpcResponse::success(id, JsonValue::Array(sets))
}

fn require_variant(params: &JsonValue) -> Result<Variant, String> {
    let name = params
        .get("set")
        .and_then(|v| v.as_str())
        .ok_or_else(|| "Missing 'set' parameter".to_string())?;
    Variant::from_name(name).ok_or_else(|| format!("Unknown set: {name}"))
}

/// `address` as a number or a string in any form `parse_address` accepts.
fn param_address(params: &JsonValue) -> Option<u16> {
    let value = params.get("address")?;
    if let Some(n) = value.as_u64() {
        u16::try_from(n).ok()
    } else {
        value.as_str().and_then(parse_address)
    }
}

fn is_audio(params: &JsonValue) -> bool {
    params.get("cpu").and_then(|v| v.as_str()) == Some("audio")
}

fn layer_json(layer: &LayerDirty) -> JsonValue {
    serde_json::json!({
        "all": layer.is_all_dirty(),
        "tiles": layer.dirty_tiles(),
    })
}
