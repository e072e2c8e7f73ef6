use ggez::event::KeyCode;

// Left-hand side of a qwerty keyboard, laid out like the COSMAC VIP keypad:
//
//   1 2 3 C        1 2 3 4
//   4 5 6 D   <-   Q W E R
//   7 8 9 E        A S D F
//   A 0 B F        Z X C V
const KEYMAP: [(KeyCode, u8); 16] = [
    (KeyCode::X, 0x0),
    (KeyCode::Key1, 0x1),
    (KeyCode::Key2, 0x2),
    (KeyCode::Key3, 0x3),
    (KeyCode::Q, 0x4),
    (KeyCode::W, 0x5),
    (KeyCode::E, 0x6),
    (KeyCode::A, 0x7),
    (KeyCode::S, 0x8),
    (KeyCode::D, 0x9),
    (KeyCode::Z, 0xA),
    (KeyCode::C, 0xB),
    (KeyCode::Key4, 0xC),
    (KeyCode::R, 0xD),
    (KeyCode::F, 0xE),
    (KeyCode::V, 0xF),
];

/// The keypad index a physical key stands for, if any.
pub fn map_key(keycode: KeyCode) -> Option<u8> {
    KEYMAP
        .iter()
        .find(|(k, _)| *k == keycode)
        .map(|(_, index)| *index)
}
