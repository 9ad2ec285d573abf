//! Leptos DragDrop Utilities
//!
//! Mouse-driven reparenting for tree tables. A drag starts after a small
//! movement threshold (so clicks stay clicks) and ends in a [`MoveIntent`]
//! handed to the caller; the DOM events never reach the business logic.

use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Where a dragged row was released
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropTarget {
    /// On another row: become its child
    Node(u32),
    /// On the root strip: become a root
    Root,
}

/// "Move `node_id` under `new_parent_id`", `None` meaning root level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveIntent {
    pub node_id: u32,
    pub new_parent_id: Option<u32>,
}

/// Turn a finished drag into a move, or `None` for dropping a row onto itself
pub fn resolve_drop(dragged_id: u32, target: DropTarget) -> Option<MoveIntent> {
    match target {
        DropTarget::Node(target_id) if target_id == dragged_id => None,
        DropTarget::Node(target_id) => Some(MoveIntent {
            node_id: dragged_id,
            new_parent_id: Some(target_id),
        }),
        DropTarget::Root => Some(MoveIntent {
            node_id: dragged_id,
            new_parent_id: None,
        }),
    }
}

/// Movement threshold in pixels to start dragging
const DRAG_THRESHOLD_PX: i32 = 5;

/// True once the pointer moved far enough from where the button went down
pub fn exceeds_threshold(start: (i32, i32), now: (i32, i32)) -> bool {
    (now.0 - start.0).abs() > DRAG_THRESHOLD_PX || (now.1 - start.1).abs() > DRAG_THRESHOLD_PX
}

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals {
    pub dragging_id: RwSignal<Option<u32>>,
    pub drop_target: RwSignal<Option<DropTarget>>,
    /// Row under mousedown that has not moved far enough yet
    pub pending_id: RwSignal<Option<u32>>,
    pub start: RwSignal<(i32, i32)>,
    /// Set briefly after a drop so the trailing click can be ignored
    pub just_dropped: RwSignal<bool>,
}

pub fn create_dnd_signals() -> DndSignals {
    DndSignals {
        dragging_id: RwSignal::new(None),
        drop_target: RwSignal::new(None),
        pending_id: RwSignal::new(None),
        start: RwSignal::new((0, 0)),
        just_dropped: RwSignal::new(false),
    }
}

impl DndSignals {
    pub fn is_dragging(&self) -> bool {
        self.dragging_id.get().is_some()
    }

    pub fn is_target(&self, target: DropTarget) -> bool {
        self.drop_target.get() == Some(target)
    }

    fn reset(&self) {
        self.dragging_id.set(None);
        self.drop_target.set(None);
        self.pending_id.set(None);
    }
}

/// End drag operation
fn end_drag(dnd: &DndSignals, dropped: bool) {
    dnd.reset();
    if !dropped {
        return;
    }
    dnd.just_dropped.set(true);
    if let Some(win) = web_sys::window() {
        let clear = dnd.just_dropped;
        let cb = wasm_bindgen::closure::Closure::<dyn FnMut()>::new(move || {
            clear.set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 100);
        cb.forget();
    }
}

/// Mousedown on a draggable row: remember it as pending
pub fn make_on_mousedown(dnd: DndSignals, node_id: u32) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        // Form controls inside the row keep their own mouse handling
        if let Some(target) = ev.target() {
            if target.dyn_ref::<web_sys::HtmlInputElement>().is_some()
                || target.dyn_ref::<web_sys::HtmlSelectElement>().is_some()
                || target.dyn_ref::<web_sys::HtmlButtonElement>().is_some()
            {
                return;
            }
        }
        dnd.pending_id.set(Some(node_id));
        dnd.start.set((ev.client_x(), ev.client_y()));
    }
}

/// Mouseenter on a drop target
pub fn make_on_mouseenter(dnd: DndSignals, target: DropTarget) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        if let Some(dragging) = dnd.dragging_id.get_untracked() {
            if resolve_drop(dragging, target).is_some() {
                dnd.drop_target.set(Some(target));
            }
        }
    }
}

pub fn make_on_mouseleave(dnd: DndSignals) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging_id.get_untracked().is_some() {
            dnd.drop_target.set(None);
        }
    }
}

fn bind_global_mousemove(dnd: DndSignals) {
    use wasm_bindgen::closure::Closure;

    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let pending = dnd.pending_id.get_untracked();
        if pending.is_some()
            && dnd.dragging_id.get_untracked().is_none()
            && exceeds_threshold(dnd.start.get_untracked(), (ev.client_x(), ev.client_y()))
        {
            dnd.dragging_id.set(pending);
        }
    });

    if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
        let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
    }
    on_mousemove.forget();
}

/// Bind the document-level handlers; `on_move` receives every completed drop
pub fn bind_global_mouseup<F>(dnd: DndSignals, on_move: F)
where
    F: Fn(MoveIntent) + Clone + 'static,
{
    use wasm_bindgen::closure::Closure;

    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        let dragging_id = dnd.dragging_id.get_untracked();
        let drop_target = dnd.drop_target.get_untracked();

        match (dragging_id, drop_target) {
            (Some(dragged), Some(target)) => {
                end_drag(&dnd, true);
                if let Some(intent) = resolve_drop(dragged, target) {
                    on_move(intent);
                }
            }
            // Plain click or released outside any target
            (dragging, _) => end_drag(&dnd, dragging.is_some()),
        }
    });

    if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
        let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
    }
    on_mouseup.forget();

    bind_global_mousemove(dnd);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_on_self_is_ignored() {
        assert_eq!(resolve_drop(4, DropTarget::Node(4)), None);
    }

    #[test]
    fn test_drop_on_row_reparents() {
        assert_eq!(
            resolve_drop(4, DropTarget::Node(9)),
            Some(MoveIntent { node_id: 4, new_parent_id: Some(9) })
        );
    }

    #[test]
    fn test_drop_on_root_strip() {
        assert_eq!(
            resolve_drop(4, DropTarget::Root),
            Some(MoveIntent { node_id: 4, new_parent_id: None })
        );
    }

    #[test]
    fn test_threshold() {
        assert!(!exceeds_threshold((10, 10), (15, 15)));
        assert!(exceeds_threshold((10, 10), (16, 10)));
        assert!(exceeds_threshold((10, 10), (10, 4)));
    }
}
