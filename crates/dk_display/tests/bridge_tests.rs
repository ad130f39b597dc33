use dk_display::{Display, HandleBridge, NativeControl, Platform, WindowId};
use dk_platform::headless::HeadlessDisplay;

struct Button {
    handle: Option<WindowId>,
}

impl NativeControl for Button {
    fn native_handle(&self) -> Option<WindowId> {
        self.handle
    }
}

#[test]
fn bridge_follows_display_platform() {
    let display = Display::new(HeadlessDisplay::default());
    let bridge = HandleBridge::for_display(&display);
    assert_eq!(bridge.platform(), Platform::Headless);

    let button = Button {
        handle: Some(display.backend().create_window()),
    };
    let key = bridge.os_constant("GWLP_USERDATA");
    assert!(bridge.set_window_property(&button, key, 0x1234));
    assert_eq!(bridge.get_window_property(&button, key), 0x1234);
    assert_eq!(bridge.native_handle(&button), button.handle.unwrap());
}

#[test]
fn unrealized_control_gets_sentinels() {
    let bridge = HandleBridge::for_identifier("headless");
    let button = Button { handle: None };
    assert_eq!(bridge.native_handle(&button), WindowId::INVALID);
    assert_eq!(bridge.get_window_property(&button, -16), 0);
    assert!(!bridge.set_window_property(&button, -16, 1));
}

#[test]
fn unknown_platform_is_inert() {
    let bridge = HandleBridge::for_identifier("motif");
    let window = WindowId::from_raw(0x2000);
    assert_eq!(bridge.os_constant("GWL_STYLE"), 0);
    assert_eq!(bridge.get_window_property(&window, -16), 0);
    assert!(!bridge.set_window_property(&window, -16, 1));
    assert!(!bridge.platform().is_windows());
}

#[test]
fn platform_identifiers() {
    assert!(HandleBridge::for_identifier("win32").platform().is_windows());
    assert!(HandleBridge::for_identifier("cocoa").platform().is_mac());
    assert_eq!(HandleBridge::for_identifier("gtk").platform(), Platform::Gtk);
}
