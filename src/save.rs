//! Binary save/load of a game snapshot
//!
//! The save file is a fixed sequential record, big-endian: level, score,
//! game speed, next piece id, current piece id, the new-game and game-over
//! flags, the grid dimensions, then the row-major cell values (-1 for
//! empty, 0-6 for the occupying piece's type id). Loading validates every
//! field before a [`SaveState`] is produced, so a damaged file can be
//! reported without touching the running game.

use crate::board::{BoardSnapshot, COL_COUNT, EMPTY_CELL, ROW_COUNT};
use crate::game::SaveState;
use crate::tetromino::PieceKind;
use directories::ProjectDirs;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// File name of the save slot
pub const SAVE_FILE: &str = "savegame.dat";

/// Why a save file could not be loaded
#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    /// The record ended before all fields were read
    Truncated,
    /// A piece id outside 0-6
    BadPieceId(i32),
    /// The stored grid does not match the board dimensions
    BadDimensions { rows: i32, cols: i32 },
    /// A grid cell that is neither empty nor a valid type id
    BadCell { index: usize, value: i32 },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(err) => write!(f, "could not read save file: {}", err),
            LoadError::Truncated => write!(f, "save file ends mid-record"),
            LoadError::BadPieceId(id) => write!(f, "save file holds invalid piece id {}", id),
            LoadError::BadDimensions { rows, cols } => write!(
                f,
                "save file grid is {}x{}, expected {}x{}",
                rows, cols, ROW_COUNT, COL_COUNT
            ),
            LoadError::BadCell { index, value } => {
                write!(f, "save file cell {} holds invalid value {}", index, value)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            LoadError::Truncated
        } else {
            LoadError::Io(err)
        }
    }
}

/// Default save location in the platform data directory
pub fn default_path() -> PathBuf {
    ProjectDirs::from("com", "quadfall", "quadfall")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SAVE_FILE)
}

/// Encode a snapshot into the save record
pub fn write_save(state: &SaveState, writer: &mut impl Write) -> io::Result<()> {
    writer.write_all(&state.level.to_be_bytes())?;
    writer.write_all(&state.score.to_be_bytes())?;
    writer.write_all(&state.game_speed.to_be_bytes())?;
    writer.write_all(&state.next.type_id().to_be_bytes())?;
    writer.write_all(&state.current.type_id().to_be_bytes())?;
    writer.write_all(&[state.is_new_game as u8])?;
    writer.write_all(&[state.is_game_over as u8])?;
    writer.write_all(&(state.board.rows as i32).to_be_bytes())?;
    writer.write_all(&(state.board.cols as i32).to_be_bytes())?;
    for &cell in &state.board.cells {
        writer.write_all(&cell.to_be_bytes())?;
    }
    Ok(())
}

/// Decode and validate a save record
pub fn read_save(reader: &mut impl Read) -> Result<SaveState, LoadError> {
    let level = read_i32(reader)?;
    let score = read_i32(reader)?;
    let game_speed = read_f32(reader)?;
    let next = read_piece(reader)?;
    let current = read_piece(reader)?;
    let is_new_game = read_bool(reader)?;
    let is_game_over = read_bool(reader)?;

    let rows = read_i32(reader)?;
    let cols = read_i32(reader)?;
    if rows != ROW_COUNT as i32 || cols != COL_COUNT as i32 {
        return Err(LoadError::BadDimensions { rows, cols });
    }

    let mut cells = Vec::with_capacity(ROW_COUNT * COL_COUNT);
    for index in 0..ROW_COUNT * COL_COUNT {
        let value = read_i32(reader)?;
        if value != EMPTY_CELL && PieceKind::from_type_id(value).is_none() {
            return Err(LoadError::BadCell { index, value });
        }
        cells.push(value);
    }

    Ok(SaveState {
        level,
        score,
        game_speed,
        next,
        current,
        is_new_game,
        is_game_over,
        board: BoardSnapshot {
            rows: ROW_COUNT,
            cols: COL_COUNT,
            cells,
        },
    })
}

/// Write the snapshot to a file, creating parent directories as needed
pub fn save_to_file(state: &SaveState, path: &Path) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_save(state, &mut writer)?;
    writer.flush()?;
    tracing::info!("game saved to {}", path.display());
    Ok(())
}

/// Read and validate a snapshot from a file
pub fn load_from_file(path: &Path) -> Result<SaveState, LoadError> {
    let file = File::open(path).map_err(LoadError::Io)?;
    let state = read_save(&mut BufReader::new(file))?;
    tracing::info!("game loaded from {}", path.display());
    Ok(state)
}

fn read_i32(reader: &mut impl Read) -> Result<i32, LoadError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_be_bytes(buf))
}

fn read_f32(reader: &mut impl Read) -> Result<f32, LoadError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_be_bytes(buf))
}

fn read_bool(reader: &mut impl Read) -> Result<bool, LoadError> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0] != 0)
}

fn read_piece(reader: &mut impl Read) -> Result<PieceKind, LoadError> {
    let id = read_i32(reader)?;
    PieceKind::from_type_id(id).ok_or(LoadError::BadPieceId(id))
}
