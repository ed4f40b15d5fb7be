use unicode_width::UnicodeWidthChar;

/// Cursor over whichever text field currently has focus. Positions count
/// chars, not bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineCursor {
    pub position: usize,
}

impl LineCursor {
    pub fn at_end(text: &str) -> Self {
        Self {
            position: text.chars().count(),
        }
    }

    pub fn input_char(&mut self, text: &mut String, c: char) {
        let byte_index = byte_index(text, self.position);
        text.insert(byte_index, c);
        self.position += 1;
    }

    pub fn delete_char(&mut self, text: &mut String) {
        if self.position > 0 {
            let byte_index = byte_index(text, self.position - 1);
            text.remove(byte_index);
            self.position -= 1;
        }
    }

    pub fn move_left(&mut self) {
        if self.position > 0 {
            self.position -= 1;
        }
    }

    pub fn move_right(&mut self, text: &str) {
        if self.position < text.chars().count() {
            self.position += 1;
        }
    }

    /// Terminal columns between the start of `text` and the cursor.
    pub fn display_offset(&self, text: &str) -> u16 {
        text.chars()
            .take(self.position)
            .map(|c| c.width().unwrap_or(0) as u16)
            .sum()
    }
}

fn byte_index(text: &str, char_pos: usize) -> usize {
    text.chars().take(char_pos).map(|c| c.len_utf8()).sum()
}
