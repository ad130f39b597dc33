use std::fmt;

/// 字体描述：字体名、磅值和样式标志
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Font {
    pub name: String,
    /// 字号（磅）
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
}

impl Font {
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
            bold: false,
            italic: false,
        }
    }

    /// 加粗
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// 斜体
    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// 去掉样式标志，保留字体名和字号
    pub fn to_plain(&self) -> Self {
        Self::new(self.name.clone(), self.size)
    }

    pub fn with_size(&self, size: u32) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bold {
            f.write_str("bold ")?;
        }
        if self.italic {
            f.write_str("italic ")?;
        }
        write!(f, "{}pt {}", self.size, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::Font;
    use std::collections::HashSet;

    #[test]
    fn test_font_display() {
        let f = Font::new("Arial", 12).with_bold().with_italic();
        assert_eq!(f.to_string(), "bold italic 12pt Arial");
        assert_eq!(f.to_plain().to_string(), "12pt Arial");
    }

    #[test]
    fn test_all_fields_participate_in_identity() {
        let base = Font::new("Arial", 12);
        let mut set = HashSet::new();
        set.insert(base.clone());
        set.insert(base.clone().with_bold());
        set.insert(base.clone().with_italic());
        set.insert(base.with_size(13));
        set.insert(Font::new("Courier", 12));
        set.insert(Font::new("Arial", 12));
        assert_eq!(set.len(), 5);
    }
}
