//! Navigation state over completed results.
//!
//! The carousel starts on the overview and can only ever show results that
//! have already completed. Illegal moves are silent no-ops.

use serde::Serialize;

use crate::constants::DEFAULT_SWIPE_THRESHOLD;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "index", rename_all = "snake_case")]
pub enum CarouselView {
    Overview,
    Viewing(usize),
}

/// Navigation input from the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavEvent {
    JumpTo(usize),
    StepForward,
    StepBackward,
    /// Horizontal travel of a completed touch gesture, `end - start`
    Swipe(f32),
    ShowOverview,
}

#[derive(Debug, Clone)]
pub struct ResultCarousel {
    view: CarouselView,
    completed: usize,
    swipe_threshold: f32,
    touch_origin: Option<f32>,
}

impl Default for ResultCarousel {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

impl ResultCarousel {
    pub fn new(swipe_threshold: f32) -> Self {
        Self {
            view: CarouselView::Overview,
            completed: 0,
            swipe_threshold: swipe_threshold.abs(),
            touch_origin: None,
        }
    }

    pub fn view(&self) -> CarouselView {
        self.view
    }

    /// `-1` for the overview, otherwise the result index
    pub fn view_index(&self) -> isize {
        match self.view {
            CarouselView::Overview => -1,
            CarouselView::Viewing(i) => i as isize,
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn swipe_threshold(&self) -> f32 {
        self.swipe_threshold
    }

    /// Raise the number of navigable results. Results are append-only, so a
    /// smaller count is ignored.
    pub fn set_completed(&mut self, completed: usize) {
        if completed > self.completed {
            self.completed = completed;
        }
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.completed {
            return false;
        }
        self.move_to(CarouselView::Viewing(index))
    }

    pub fn step_forward(&mut self) -> bool {
        match self.view {
            CarouselView::Overview if self.completed > 0 => self.move_to(CarouselView::Viewing(0)),
            CarouselView::Viewing(i) if i + 1 < self.completed => self.move_to(CarouselView::Viewing(i + 1)),
            _ => false,
        }
    }

    pub fn step_backward(&mut self) -> bool {
        match self.view {
            CarouselView::Viewing(0) => self.move_to(CarouselView::Overview),
            CarouselView::Viewing(i) => self.move_to(CarouselView::Viewing(i - 1)),
            CarouselView::Overview => false,
        }
    }

    /// Leftward travel past the threshold moves forward, rightward moves back.
    pub fn swipe(&mut self, delta_x: f32) -> bool {
        if delta_x < -self.swipe_threshold {
            self.step_forward()
        } else if delta_x > self.swipe_threshold {
            self.step_backward()
        } else {
            false
        }
    }

    pub fn show_overview(&mut self) -> bool {
        self.move_to(CarouselView::Overview)
    }

    pub fn touch_start(&mut self, x: f32) {
        self.touch_origin = Some(x);
    }

    /// Completes a gesture begun with [`touch_start`](Self::touch_start).
    /// A stray end without a start does nothing.
    pub fn touch_end(&mut self, x: f32) -> bool {
        match self.touch_origin.take() {
            Some(origin) => self.swipe(x - origin),
            None => false,
        }
    }

    /// Apply one event; returns whether the view changed.
    pub fn apply(&mut self, event: NavEvent) -> bool {
        match event {
            NavEvent::JumpTo(index) => self.jump_to(index),
            NavEvent::StepForward => self.step_forward(),
            NavEvent::StepBackward => self.step_backward(),
            NavEvent::Swipe(delta_x) => self.swipe(delta_x),
            NavEvent::ShowOverview => self.show_overview(),
        }
    }

    fn move_to(&mut self, view: CarouselView) -> bool {
        let changed = self.view != view;
        self.view = view;
        changed
    }
}
