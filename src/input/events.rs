//! Canonical table of engine events and the handler names callers use for them
//!
//! The pairing is `engine event name -> "on" + CamelCase name`, e.g.
//! `dblclick -> onDoubleClick`, `moveend -> onMoveEnd`. The table is built once
//! per process and never mutated.

use once_cell::sync::Lazy;

/// `(engine event, camel-case stem)` pairs, in engine documentation order
const ENGINE_EVENTS: [(&str, &str); 45] = [
    ("resize", "resize"),
    ("remove", "remove"),
    ("mousedown", "mouseDown"),
    ("mouseup", "mouseUp"),
    ("mouseover", "mouseOver"),
    ("mousemove", "mouseMove"),
    ("click", "click"),
    ("dblclick", "doubleClick"),
    ("mouseenter", "mouseEnter"),
    ("mouseleave", "mouseLeave"),
    ("mouseout", "mouseOut"),
    ("contextmenu", "contextMenu"),
    ("wheel", "wheel"),
    ("touchstart", "touchStart"),
    ("touchend", "touchEnd"),
    ("touchmove", "touchMove"),
    ("touchcancel", "touchCancel"),
    ("movestart", "moveStart"),
    ("move", "move"),
    ("moveend", "moveEnd"),
    ("dragstart", "dragStart"),
    ("drag", "drag"),
    ("dragend", "dragEnd"),
    ("zoomstart", "zoomStart"),
    ("zoom", "zoom"),
    ("zoomend", "zoomEnd"),
    ("rotatestart", "rotateStart"),
    ("rotate", "rotate"),
    ("rotateend", "rotateEnd"),
    ("pitchstart", "pitchStart"),
    ("pitch", "pitch"),
    ("pitchend", "pitchEnd"),
    ("boxzoomstart", "boxZoomStart"),
    ("boxzoomend", "boxZoomEnd"),
    ("boxzoomcancel", "boxZoomCancel"),
    ("load", "load"),
    ("render", "render"),
    ("idle", "idle"),
    ("error", "error"),
    ("data", "data"),
    ("styledata", "styleData"),
    ("sourcedata", "sourceData"),
    ("dataloading", "dataLoading"),
    ("styledataloading", "styleDataLoading"),
    ("sourcedataloading", "sourceDataLoading"),
];

/// One row of the canonical table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventBinding {
    pub engine_event: &'static str,
    pub semantic_name: String,
}

static EVENT_TABLE: Lazy<Vec<EventBinding>> = Lazy::new(|| {
    ENGINE_EVENTS
        .iter()
        .map(|&(engine_event, stem)| EventBinding {
            engine_event,
            semantic_name: handler_name(stem),
        })
        .collect()
});

fn handler_name(stem: &str) -> String {
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => format!("on{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => "on".to_string(),
    }
}

/// Every known binding, in table order
pub fn event_table() -> &'static [EventBinding] {
    &EVENT_TABLE
}

/// Looks up the table row for a semantic handler name such as `onMoveEnd`
pub fn lookup_semantic(semantic_name: &str) -> Option<&'static EventBinding> {
    EVENT_TABLE.iter().find(|b| b.semantic_name == semantic_name)
}

/// Semantic handler name for an engine event, e.g. `moveend -> onMoveEnd`
pub fn semantic_name_for(engine_event: &str) -> Option<&'static str> {
    EVENT_TABLE
        .iter()
        .find(|b| b.engine_event == engine_event)
        .map(|b| b.semantic_name.as_str())
}
