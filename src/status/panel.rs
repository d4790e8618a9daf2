//! Dashboard panel rendering
//!
//! Maps a [`DeviceStatusSnapshot`] to the class/text pair each dashboard
//! element should show. Pure: the same snapshot always renders the same panel.

use serde::Serialize;
use std::fmt;

use super::snapshot::{value_text, DeviceStatusSnapshot};

/// Dashboard elements, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Element {
    MotionSensor,
    DistanceSensor,
    RfidReader,
    FrontDoor,
    BackDoor,
    Window1,
    LedLight,
}

impl Element {
    pub const ALL: [Element; 7] = [
        Element::MotionSensor,
        Element::DistanceSensor,
        Element::RfidReader,
        Element::FrontDoor,
        Element::BackDoor,
        Element::Window1,
        Element::LedLight,
    ];

    /// DOM id of the element on the dashboard page
    pub fn id(&self) -> &'static str {
        match self {
            Element::MotionSensor => "motionSensor",
            Element::DistanceSensor => "distanceSensor",
            Element::RfidReader => "rfidReader",
            Element::FrontDoor => "frontDoor",
            Element::BackDoor => "backDoor",
            Element::Window1 => "window1",
            Element::LedLight => "ledLight",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Element::MotionSensor => "Motion Sensor",
            Element::DistanceSensor => "Distance Sensor",
            Element::RfidReader => "RFID Reader",
            Element::FrontDoor => "Front Door",
            Element::BackDoor => "Back Door",
            Element::Window1 => "Window 1",
            Element::LedLight => "LED Light",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rendered state of one element.
///
/// `add_class` goes onto the element and `remove_class` comes off it. The
/// distance sensor only carries text, so both are `None` there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceView {
    pub element: Element,
    pub add_class: Option<&'static str>,
    pub remove_class: Option<&'static str>,
    pub text: String,
}

impl DeviceView {
    fn toggled(element: Element, on: bool, classes: (&'static str, &'static str), text: String) -> Self {
        let (on_class, off_class) = classes;
        let (add, remove) = if on {
            (on_class, off_class)
        } else {
            (off_class, on_class)
        };
        Self {
            element,
            add_class: Some(add),
            remove_class: Some(remove),
            text,
        }
    }
}

/// One rendered snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Panel {
    pub views: Vec<DeviceView>,
}

/// An element whose text changed between two renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub element: Element,
    pub from: String,
    pub to: String,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.element, self.from, self.to)
    }
}

impl Panel {
    pub fn get(&self, element: Element) -> Option<&DeviceView> {
        self.views.iter().find(|v| v.element == element)
    }

    /// Elements whose text differs from `previous`
    pub fn changes_since(&self, previous: &Panel) -> Vec<Change> {
        self.views
            .iter()
            .filter_map(|view| {
                let before = previous.get(view.element)?;
                (before.text != view.text).then(|| Change {
                    element: view.element,
                    from: before.text.clone(),
                    to: view.text.clone(),
                })
            })
            .collect()
    }
}

/// Render a snapshot into a panel
pub fn render(snapshot: &DeviceStatusSnapshot) -> Panel {
    let views = Element::ALL
        .iter()
        .map(|element| render_element(*element, snapshot))
        .collect();
    Panel { views }
}

fn render_element(element: Element, snapshot: &DeviceStatusSnapshot) -> DeviceView {
    match element {
        Element::MotionSensor => {
            let active = value_text(&snapshot.motion_sensor).as_deref() == Some("active");
            let text = if active { "Motion Detected!" } else { "No Motion" };
            DeviceView::toggled(element, active, ("active", "inactive"), text.to_string())
        }
        Element::DistanceSensor => {
            let distance = value_text(&snapshot.distance_sensor)
                .unwrap_or_else(|| "Unknown".to_string());
            DeviceView {
                element,
                add_class: None,
                remove_class: None,
                text: format!("{} meters", distance),
            }
        }
        Element::RfidReader => match value_text(&snapshot.rfid_reader) {
            Some(tag) => DeviceView::toggled(element, true, ("active", "inactive"), tag),
            None => DeviceView::toggled(element, false, ("active", "inactive"), "None".to_string()),
        },
        Element::FrontDoor | Element::BackDoor | Element::Window1 => {
            let value = match element {
                Element::FrontDoor => &snapshot.front_door,
                Element::BackDoor => &snapshot.back_door,
                _ => &snapshot.window1,
            };
            let locked = value_text(value).as_deref() == Some("locked");
            let text = if locked { "Locked" } else { "Unlocked" };
            DeviceView::toggled(element, locked, ("locked", "unlocked"), text.to_string())
        }
        Element::LedLight => {
            let on = value_text(&snapshot.led_light).as_deref() == Some("on");
            let text = if on { "On" } else { "Off" };
            DeviceView::toggled(element, on, ("led-on", "led-off"), text.to_string())
        }
    }
}
