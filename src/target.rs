//! Board to target-triple mapping.

use crate::options::Board;

/// Triple for the msp430fr5994 board.
pub const MSP430_TRIPLE: &str = "msp430-none-elf";

/// Triple for the Cortex-M boards (apollo4bp and its QEMU emulation).
pub const CORTEX_M_TRIPLE: &str = "thumbv7em-none-eabihf";

/// The compiler target triple cargo builds for on a given board.
pub fn triple_for(board: Board) -> &'static str {
    match board {
        Board::Msp430fr5994 => MSP430_TRIPLE,
        Board::Apollo4bp | Board::Qemu => CORTEX_M_TRIPLE,
    }
}

/// Whether the board's toolchain lacks a prebuilt `core` and the build must
/// compile it from source.
pub fn needs_build_std(board: Board) -> bool {
    matches!(board, Board::Msp430fr5994)
}
