use image::{Cell, SENTINEL};

use crate::config::IsaConfig;

/// Appends `subleq` triples and raw cells to a growing image.
///
/// The buffer starts with the preamble, so [`position`](Self::position) is
/// always the absolute address of the next cell. Every template leaves the
/// scratch cell `X` at zero when it finishes.
pub struct Emitter<'c> {
    cells: Vec<Cell>,
    config: &'c IsaConfig,
}

impl<'c> Emitter<'c> {
    pub fn new(config: &'c IsaConfig) -> Self {
        Self {
            cells: config.preamble.clone(),
            config,
        }
    }

    /// Address of the next cell to be written.
    pub fn position(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    fn x(&self) -> Cell {
        self.config.scratch_x as Cell
    }

    fn y(&self) -> Cell {
        self.config.scratch_y as Cell
    }

    /// Address just past a triple written at the current position.
    fn fallthrough(&self) -> Cell {
        (self.position() + 3) as Cell
    }

    // ── raw ────────────────────────────────────────────────────────

    pub fn word(&mut self, value: Cell) {
        self.cells.push(value);
    }

    pub fn words(&mut self, values: &[Cell]) {
        self.cells.extend_from_slice(values);
    }

    /// `subleq a b c`.
    pub fn triple(&mut self, a: Cell, b: Cell, c: Cell) {
        self.cells.extend_from_slice(&[a, b, c]);
    }

    /// `subleq a b` continuing with the next triple either way.
    fn step(&mut self, a: Cell, b: Cell) {
        let next = self.fallthrough();
        self.triple(a, b, next);
    }

    // ── templates ──────────────────────────────────────────────────

    pub fn noop(&mut self) {
        self.step(self.x(), self.x());
    }

    /// `b += a`: `X = -a`, `b -= X`, clear `X`.
    pub fn add(&mut self, a: Cell, b: Cell) {
        let x = self.x();
        self.step(a, x);
        self.step(x, b);
        self.step(x, x);
    }

    pub fn sub(&mut self, a: Cell, b: Cell) {
        self.step(a, b);
    }

    pub fn zero(&mut self, a: Cell) {
        self.step(a, a);
    }

    pub fn mov(&mut self, src: Cell, dest: Cell) {
        self.zero(dest);
        self.add(src, dest);
    }

    pub fn jump(&mut self, target: Cell) {
        self.triple(self.x(), self.x(), target);
    }

    /// Jump to `target` if `value == 0`, leaving `value` unchanged.
    ///
    /// ```text
    /// p+0:  value X p+6     X = -value; taken when value >= 0
    /// p+3:  X X p+12        value < 0: clear X, skip the rest
    /// p+6:  X X p+9         clear X
    /// p+9:  X value target  value - 0; taken when value <= 0
    /// ```
    pub fn branch_if_zero(&mut self, value: Cell, target: Cell) {
        let x = self.x();
        let p = self.position() as Cell;
        self.triple(value, x, p + 6);
        self.triple(x, x, p + 12);
        self.triple(x, x, p + 9);
        self.triple(x, value, target);
    }

    /// Jump to `target` if `a == b`, using `Y` for the difference.
    pub fn compare_equal(&mut self, a: Cell, b: Cell, target: Cell) {
        let y = self.y();
        self.mov(a, y);
        self.sub(b, y);
        self.branch_if_zero(y, target);
    }

    pub fn input(&mut self, dest: Cell) {
        self.step(SENTINEL, dest);
    }

    pub fn output(&mut self, src: Cell) {
        self.step(src, SENTINEL);
    }

    pub fn halt(&mut self, status: Cell) {
        self.triple(SENTINEL, SENTINEL, status);
    }
}
