//! Page-wide singletons (WASM is single-threaded).

use mg_session::{MintWidget, MintWidgetProps, SessionController};
use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    static CONTROLLER: RefCell<Option<Rc<SessionController>>> = const { RefCell::new(None) };
    static WIDGET: RefCell<Option<MintWidget>> = const { RefCell::new(None) };
}

pub fn install(controller: Rc<SessionController>) {
    CONTROLLER.with(|slot| *slot.borrow_mut() = Some(controller));
}

pub fn controller() -> Option<Rc<SessionController>> {
    CONTROLLER.with(|slot| slot.borrow().clone())
}

/// Keep the widget in step with the controller; `None` unmounts it.
pub fn sync_widget(props: Option<MintWidgetProps>) -> Option<MintWidget> {
    WIDGET.with(|slot| {
        let mut slot = slot.borrow_mut();
        match (props, slot.as_mut()) {
            (Some(props), Some(widget)) => widget.set_props(props),
            (Some(props), None) => *slot = Some(MintWidget::new(props)),
            (None, _) => *slot = None,
        }
        slot.clone()
    })
}

pub fn with_widget<R>(f: impl FnOnce(&mut MintWidget) -> R) -> Option<R> {
    WIDGET.with(|slot| slot.borrow_mut().as_mut().map(f))
}
