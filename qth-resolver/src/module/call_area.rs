//! JA call area lookup
//!
//! Maps a prefecture name to the digit of the Japanese call sign area
//! (JA1..JA8, JA0). Each prefecture is listed under its Japanese name and
//! its English name; both spellings map to the same area.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Call areas in the order they are usually listed: 1 through 8, then 0.
pub static CALL_AREAS: &[(u8, &[&str])] = &[
    (
        1,
        &[
            "東京都", "神奈川県", "千葉県", "埼玉県", "茨城県", "栃木県", "群馬県", "山梨県",
            "Tokyo", "Kanagawa", "Chiba", "Saitama", "Ibaraki", "Tochigi", "Gunma", "Yamanashi",
        ],
    ),
    (
        2,
        &[
            "静岡県", "岐阜県", "愛知県", "三重県",
            "Shizuoka", "Gifu", "Aichi", "Mie",
        ],
    ),
    (
        3,
        &[
            "京都府", "滋賀県", "奈良県", "大阪府", "和歌山県", "兵庫県",
            "Kyoto", "Shiga", "Nara", "Osaka", "Wakayama", "Hyogo",
        ],
    ),
    (
        4,
        &[
            "岡山県", "島根県", "山口県", "鳥取県", "広島県",
            "Okayama", "Shimane", "Yamaguchi", "Tottori", "Hiroshima",
        ],
    ),
    (
        5,
        &[
            "香川県", "徳島県", "愛媛県", "高知県",
            "Kagawa", "Tokushima", "Ehime", "Kochi",
        ],
    ),
    (
        6,
        &[
            "福岡県", "佐賀県", "長崎県", "熊本県", "大分県", "宮崎県", "鹿児島県", "沖縄県",
            "Fukuoka", "Saga", "Nagasaki", "Kumamoto", "Oita", "Miyazaki", "Kagoshima", "Okinawa",
        ],
    ),
    (
        7,
        &[
            "青森県", "岩手県", "秋田県", "山形県", "宮城県", "福島県",
            "Aomori", "Iwate", "Akita", "Yamagata", "Miyagi", "Fukushima",
        ],
    ),
    (8, &["北海道", "Hokkaido"]),
    (
        0,
        &[
            "新潟県", "長野県", "富山県", "石川県", "福井県",
            "Niigata", "Nagano", "Toyama", "Ishikawa", "Fukui",
        ],
    ),
];

static CALL_AREA_MAP: OnceLock<HashMap<&'static str, u8>> = OnceLock::new();

fn get_call_area_map() -> &'static HashMap<&'static str, u8> {
    CALL_AREA_MAP.get_or_init(|| {
        let mut map = HashMap::new();
        for (area, names) in CALL_AREAS {
            for name in names.iter() {
                map.insert(*name, *area);
            }
        }
        map
    })
}

/// Call area digit for a prefecture name, exact match only.
pub fn call_area_for(region: &str) -> Option<u8> {
    get_call_area_map().get(region).copied()
}

/// All names registered for one call area.
pub fn prefectures_in(area: u8) -> &'static [&'static str] {
    CALL_AREAS
        .iter()
        .find(|(a, _)| *a == area)
        .map(|(_, names)| *names)
        .unwrap_or(&[])
}
