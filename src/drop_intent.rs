//! Pointer + geometry → discrete drop intent (§4.B).
//!
//! Shared by both the dock-tree and file-tree managers: the classifier
//! itself owns no tree state, it only turns pixel coordinates into one of
//! the stable tokens in [`DropIntent`] / [`FileDropIntent`].

/// A point in the host's 2D coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// An axis-aligned rectangle, `(x, y)` at the top-left, growing right/down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    fn left(&self) -> f32 {
        self.x
    }
    fn right(&self) -> f32 {
        self.x + self.width
    }
    fn top(&self) -> f32 {
        self.y
    }
    fn bottom(&self) -> f32 {
        self.y + self.height
    }
    fn center(&self) -> Point {
        Point { x: self.x + self.width / 2.0, y: self.y + self.height / 2.0 }
    }

    fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }
}

/// Discrete output of the panel/single-tab/tab-header classifiers (§4.B).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropIntent {
    Top,
    Right,
    Bottom,
    Left,
    TabBefore,
    TabAfter,
    TabInto,
}

/// Discrete output of the file-tree row classifier (§4.B "File-tree drop").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileDropIntent {
    Before,
    Inside,
    After,
}

/// Panel drop: pointer over a panel's rect, optionally with a header rect.
///
/// If `header` is present and the pointer lies inside it, the drop targets
/// tab insertion (`TabInto`). Otherwise the nearest edge of `target` wins,
/// ties broken top, bottom, left, right.
pub fn classify_panel_drop(pointer: Point, target: Rect, header: Option<Rect>) -> DropIntent {
    if let Some(header) = header {
        if header.contains(pointer) {
            return DropIntent::TabInto;
        }
    }

    let dist_top = (pointer.y - target.top()).abs();
    let dist_bottom = (pointer.y - target.bottom()).abs();
    let dist_left = (pointer.x - target.left()).abs();
    let dist_right = (pointer.x - target.right()).abs();

    // Tie-break order: top, bottom, left, right.
    let candidates = [
        (DropIntent::Top, dist_top),
        (DropIntent::Bottom, dist_bottom),
        (DropIntent::Left, dist_left),
        (DropIntent::Right, dist_right),
    ];

    candidates
        .into_iter()
        .min_by(|a, b| a.1.partial_cmp(&b.1).expect("distances are finite"))
        .map(|(intent, _)| intent)
        .expect("candidates is non-empty")
}

/// Single-tab drop: pointer over one tab's rect, optionally within an
/// enclosing container rect that can redirect to an edge split.
pub fn classify_single_tab_drop(pointer: Point, tab: Rect, container: Option<Rect>) -> DropIntent {
    if let Some(container) = container {
        let center = tab.center();
        let far_from_center = (pointer.x - center.x).abs() > 30.0 || (pointer.y - center.y).abs() > 30.0;
        if far_from_center {
            let near_left = (pointer.x - container.left()).abs() <= 20.0;
            let near_right = (pointer.x - container.right()).abs() <= 20.0;
            let near_top = (pointer.y - container.top()).abs() <= 20.0;
            let near_bottom = (pointer.y - container.bottom()).abs() <= 20.0;
            if near_left {
                return DropIntent::Left;
            }
            if near_right {
                return DropIntent::Right;
            }
            if near_top {
                return DropIntent::Top;
            }
            if near_bottom {
                return DropIntent::Bottom;
            }
        }
    }

    thirds(pointer.x, tab)
}

fn thirds(x: f32, tab: Rect) -> DropIntent {
    let third = tab.width / 3.0;
    if x < tab.left() + third {
        DropIntent::TabBefore
    } else if x > tab.right() - third {
        DropIntent::TabAfter
    } else {
        DropIntent::TabInto
    }
}

/// One element of the ordered tab-header strip passed to
/// [`classify_tab_header_drop`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TabElement {
    pub rect: Rect,
}

/// The result of [`classify_tab_header_drop`]: an intent plus the index of
/// the tab it targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TabHeaderDrop {
    pub intent: DropIntent,
    pub target_index: usize,
}

/// Tab-header drop: pointer x against a left-to-right ordered tab strip.
pub fn classify_tab_header_drop(pointer_x: f32, tabs: &[TabElement]) -> Option<TabHeaderDrop> {
    if tabs.is_empty() {
        return None;
    }

    let last = tabs.len() - 1;

    if pointer_x < tabs[0].rect.left() {
        return Some(TabHeaderDrop { intent: DropIntent::TabBefore, target_index: 0 });
    }
    if pointer_x > tabs[last].rect.right() {
        return Some(TabHeaderDrop { intent: DropIntent::TabAfter, target_index: last });
    }

    for (i, tab) in tabs.iter().enumerate() {
        if pointer_x >= tab.rect.left() && pointer_x <= tab.rect.right() {
            let intent = thirds(pointer_x, tab.rect);
            return Some(match intent {
                DropIntent::TabBefore if i == last => {
                    TabHeaderDrop { intent: DropIntent::TabAfter, target_index: last }
                }
                DropIntent::TabAfter => TabHeaderDrop { intent: DropIntent::TabAfter, target_index: i },
                _ => TabHeaderDrop { intent, target_index: i },
            });
        }

        if i < last {
            let gap_start = tab.rect.right();
            let gap_end = tabs[i + 1].rect.left();
            if pointer_x > gap_start && pointer_x < gap_end {
                let midpoint = (gap_start + gap_end) / 2.0;
                return Some(if pointer_x < midpoint {
                    TabHeaderDrop { intent: DropIntent::TabAfter, target_index: i }
                } else {
                    TabHeaderDrop { intent: DropIntent::TabBefore, target_index: i + 1 }
                });
            }
        }
    }

    // Shouldn't be reachable given the bounds checks above, but pointer
    // coordinates outside all rects and gaps fall back to the nearest end.
    Some(TabHeaderDrop { intent: DropIntent::TabAfter, target_index: last })
}

/// File-tree drop: pointer y within a row rect. Files have no "inside"
/// zone (50/50 split); folders use 30/40/30.
pub fn classify_file_tree_drop(pointer_y: f32, row: Rect, is_folder: bool) -> FileDropIntent {
    let relative = (pointer_y - row.top()) / row.height;
    if is_folder {
        if relative < 0.3 {
            FileDropIntent::Before
        } else if relative < 0.7 {
            FileDropIntent::Inside
        } else {
            FileDropIntent::After
        }
    } else if relative < 0.5 {
        FileDropIntent::Before
    } else {
        FileDropIntent::After
    }
}
