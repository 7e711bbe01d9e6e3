//! Cyrillic-to-Latin transliteration for filesystem-safe tokens.

/// Transliterate Russian text to Latin ASCII.
///
/// Characters outside the mapping are kept only if alphanumeric or one of
/// space, `-`, `_`; everything else is dropped. Hard and soft signs map to
/// nothing.
pub fn transliterate(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match translit_char(ch) {
            Some(mapped) => result.push_str(mapped),
            None if ch.is_alphanumeric() || matches!(ch, ' ' | '-' | '_') => result.push(ch),
            None => {}
        }
    }
    result
}

fn translit_char(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        'А' => "A",
        'Б' => "B",
        'В' => "V",
        'Г' => "G",
        'Д' => "D",
        'Е' => "E",
        'Ё' => "Yo",
        'Ж' => "Zh",
        'З' => "Z",
        'И' => "I",
        'Й' => "Y",
        'К' => "K",
        'Л' => "L",
        'М' => "M",
        'Н' => "N",
        'О' => "O",
        'П' => "P",
        'Р' => "R",
        'С' => "S",
        'Т' => "T",
        'У' => "U",
        'Ф' => "F",
        'Х' => "H",
        'Ц' => "Ts",
        'Ч' => "Ch",
        'Ш' => "Sh",
        'Щ' => "Sch",
        'Ъ' => "",
        'Ы' => "Y",
        'Ь' => "",
        'Э' => "E",
        'Ю' => "Yu",
        'Я' => "Ya",
        _ => return None,
    };
    Some(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transliterates_missile_names() {
        assert_eq!(transliterate("Тополь-М"), "Topol-M");
        assert_eq!(transliterate("Искандер"), "Iskander");
        assert_eq!(transliterate("Х-55"), "H-55");
    }

    #[test]
    fn drops_punctuation_and_signs() {
        assert_eq!(transliterate("объект \"Куб\""), "obekt Kub");
        assert_eq!(transliterate("Р-36М2 (15А18М)"), "R-36M2 15A18M");
    }

    #[test]
    fn keeps_latin_and_digits() {
        assert_eq!(transliterate("SS-18 Satan"), "SS-18 Satan");
    }
}
