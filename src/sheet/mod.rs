mod gesture;
mod settle;
mod widget;
pub(crate) use self::gesture::{CaptureScope, DragDismiss};
pub(crate) use self::widget::{row_to_px, BottomSheet, SheetHit, SheetLayout};
