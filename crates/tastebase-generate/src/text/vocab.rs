//! Static vocabulary for locally generated records.

/// Seoul district with its approximate centre and a few arterial roads.
#[derive(Debug, Clone, Copy)]
pub struct District {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub streets: &'static [&'static str],
}

pub const REGION_SI_DO: &str = "Seoul";

pub const DISTRICTS: [District; 25] = [
    District {
        name: "Jongno-gu",
        latitude: 37.5730,
        longitude: 126.9794,
        streets: &["Jong-ro", "Yulgok-ro", "Sajik-ro", "Samcheong-ro"],
    },
    District {
        name: "Jung-gu",
        latitude: 37.5636,
        longitude: 126.9976,
        streets: &["Sejong-daero", "Eulji-ro", "Toegye-ro", "Cheonggyecheon-ro"],
    },
    District {
        name: "Yongsan-gu",
        latitude: 37.5326,
        longitude: 126.9905,
        streets: &["Hangang-daero", "Itaewon-ro", "Huam-ro", "Hannam-daero"],
    },
    District {
        name: "Seongdong-gu",
        latitude: 37.5633,
        longitude: 127.0364,
        streets: &["Wangsimni-ro", "Seongsuil-ro", "Ttukseom-ro", "Muhak-ro"],
    },
    District {
        name: "Gwangjin-gu",
        latitude: 37.5380,
        longitude: 127.0820,
        streets: &["Gwangnaru-ro", "Neungdong-ro", "Jayang-ro", "Achasan-ro"],
    },
    District {
        name: "Dongdaemun-gu",
        latitude: 37.5744,
        longitude: 127.0396,
        streets: &["Wangsan-ro", "Dapsimni-ro", "Hoegi-ro", "Imun-ro"],
    },
    District {
        name: "Jungnang-gu",
        latitude: 37.6060,
        longitude: 127.0927,
        streets: &["Myeonmok-ro", "Sagajeong-ro", "Mangu-ro", "Sangbong-ro"],
    },
    District {
        name: "Seongbuk-gu",
        latitude: 37.5894,
        longitude: 127.0167,
        streets: &["Seongbuk-ro", "Jeongneung-ro", "Bomun-ro", "Jangwi-ro"],
    },
    District {
        name: "Gangbuk-gu",
        latitude: 37.6396,
        longitude: 127.0257,
        streets: &["Dobong-ro", "Samyang-ro", "Hancheon-ro", "Suyu-ro"],
    },
    District {
        name: "Dobong-gu",
        latitude: 37.6688,
        longitude: 127.0471,
        streets: &["Dobong-ro", "Madeul-ro", "Banghak-ro", "Nohae-ro"],
    },
    District {
        name: "Nowon-gu",
        latitude: 37.6543,
        longitude: 127.0568,
        streets: &["Nowon-ro", "Sanggye-ro", "Dongil-ro", "Madeul-ro"],
    },
    District {
        name: "Eunpyeong-gu",
        latitude: 37.6176,
        longitude: 126.9227,
        streets: &["Yeonseo-ro", "Tongil-ro", "Bulgwang-ro", "Susaek-ro"],
    },
    District {
        name: "Seodaemun-gu",
        latitude: 37.5791,
        longitude: 126.9368,
        streets: &["Yonsei-ro", "Sinchon-ro", "Chungjeong-ro", "Dongnimmun-ro"],
    },
    District {
        name: "Mapo-gu",
        latitude: 37.5663,
        longitude: 126.9018,
        streets: &["Mapo-daero", "World Cup-ro", "Seongsan-ro", "Dongmak-ro"],
    },
    District {
        name: "Yangcheon-gu",
        latitude: 37.5169,
        longitude: 126.8664,
        streets: &["Mokdong-ro", "Omok-ro", "Sinwol-ro", "Yangcheon-ro"],
    },
    District {
        name: "Gangseo-gu",
        latitude: 37.5509,
        longitude: 126.8495,
        streets: &["Hwagok-ro", "Gonghang-daero", "Banghwa-daero", "Yangcheon-ro"],
    },
    District {
        name: "Guro-gu",
        latitude: 37.4954,
        longitude: 126.8876,
        streets: &["Gurojungang-ro", "Gyeongin-ro", "Digital-ro", "Gocheok-ro"],
    },
    District {
        name: "Geumcheon-gu",
        latitude: 37.4569,
        longitude: 126.8956,
        streets: &["Siheung-daero", "Geumha-ro", "Doksan-ro", "Gasan Digital 1-ro"],
    },
    District {
        name: "Yeongdeungpo-gu",
        latitude: 37.5268,
        longitude: 126.8960,
        streets: &["Gukhoe-daero", "Yeoui-daero", "Yeongdeungpo-ro", "Dangsan-ro"],
    },
    District {
        name: "Dongjak-gu",
        latitude: 37.5124,
        longitude: 126.9393,
        streets: &["Noryangjin-ro", "Heukseok-ro", "Sangdo-ro", "Dongjak-daero"],
    },
    District {
        name: "Gwanak-gu",
        latitude: 37.4784,
        longitude: 126.9516,
        streets: &["Gwanak-ro", "Sillim-ro", "Boramae-ro", "Nakseongdae-ro"],
    },
    District {
        name: "Seocho-gu",
        latitude: 37.4836,
        longitude: 127.0327,
        streets: &["Seocho-daero", "Banpo-daero", "Sapyeong-daero", "Yangjae-daero"],
    },
    District {
        name: "Gangnam-gu",
        latitude: 37.5172,
        longitude: 127.0473,
        streets: &["Gangnam-daero", "Teheran-ro", "Seolleung-ro", "Dosan-daero"],
    },
    District {
        name: "Songpa-gu",
        latitude: 37.5146,
        longitude: 127.1059,
        streets: &["Olympic-ro", "Songpa-daero", "Wiryeseong-daero", "Garak-ro"],
    },
    District {
        name: "Gangdong-gu",
        latitude: 37.5302,
        longitude: 127.1238,
        streets: &["Cheonho-daero", "Seongnae-ro", "Sangil-ro", "Dunchon-ro"],
    },
];

pub const OPENING_HOURS: [&str; 8] = [
    "10:00 ~ 22:00",
    "11:00 ~ 21:30",
    "09:30 ~ 20:00",
    "11:30 ~ 22:00",
    "10:00 ~ 20:00",
    "12:00 ~ 23:00",
    "Mon-Fri 11:00-21:00; Sat-Sun 12:00-22:00",
    "Daily 10:30-21:30 (break 15:00-17:00)",
];

pub const NAME_PREFIXES: [&str; 16] = [
    "Matjip", "Jeongdam", "Ongi", "Damso", "Hansup", "Sodam", "Homi", "Banga", "Daon", "Chorok",
    "Doran", "Hansang", "Haengbok", "Morak", "Miso", "Pungmi",
];

pub const NAME_SUFFIXES: [&str; 11] = [
    "Kitchen", "House", "Dabang", "Bunsik", "Table", "Bistro", "Pocha", "Workshop", "Pub", "Dining",
    "Hall",
];

pub const DESCRIPTION_TEMPLATES: [&str; 4] = [
    "{category} specialist in {district}",
    "Neighbourhood {category} spot in {district}",
    "{category} favourites served daily in {district}",
    "Cozy {category} place near the heart of {district}",
];

/// Weighted pick list for the number of gallery images.
pub const IMAGE_COUNTS: [usize; 7] = [1, 2, 3, 3, 3, 4, 5];

/// Weighted pick list for the number of locally chosen categories.
pub const CATEGORY_COUNTS: [usize; 4] = [1, 2, 2, 3];

pub const EMAIL_DOMAINS: [&str; 7] = [
    "gmail.com",
    "naver.com",
    "daum.net",
    "kakao.com",
    "outlook.com",
    "icloud.com",
    "yahoo.com",
];

pub const NICK_ADJECTIVES: [&str; 24] = [
    "Blue", "Happy", "Smiling", "Quiet", "Little", "Big", "Slow", "Swift", "Dawn", "Evening",
    "Moonlit", "Sunny", "Green", "Azure", "Sunset", "Spring", "Autumn", "Winter", "Warm",
    "Earnest", "Fresh", "Crisp", "Friendly", "Joyful",
];

pub const NICK_NOUNS: [&str; 24] = [
    "Whale", "Fox", "Panda", "Otter", "Cat", "Puppy", "Hedgehog", "Rabbit", "Sparrow", "Owl",
    "Penguin", "Koala", "Squirrel", "Dolphin", "Lynx", "Wolf", "Tiger", "Lion", "Cheetah",
    "Cricket", "Snail", "Roe", "Deer", "Mole",
];

pub const NICK_SYLLABLES: [&str; 40] = [
    "ga", "na", "da", "ra", "ma", "ba", "sa", "a", "ja", "cha", "ka", "ta", "pa", "ha", "ho",
    "hee", "yu", "yoon", "yeon", "young", "ye", "woo", "eun", "jeong", "jun", "jin", "ji", "su",
    "seo", "seon", "seong", "se", "so", "song", "seung", "si", "shin", "joo", "hyun", "hoon",
];

pub const BIO_TEMPLATES: [&str; 6] = [
    "{nick} here. Let's find great places to eat together!",
    "Little daily notes from {nick}.",
    "{nick} | coffee and long walks.",
    "{nick} | exploring new menus.",
    "{nick} | eating well today too!",
    "{nick} | loves taking food photos.",
];

pub const POSITIVE_NOTES: [&str; 7] = [
    "clean and tidy",
    "fresh ingredients",
    "full of flavour",
    "friendly staff",
    "lovely atmosphere",
    "would happily come back",
    "fair prices too",
];

pub const NEUTRAL_NOTES: [&str; 4] = [
    "nothing special",
    "pretty ordinary",
    "a few things to improve",
    "the atmosphere was fine",
];

pub const NEGATIVE_NOTES: [&str; 4] = [
    "far too salty",
    "blander than expected",
    "service was lacking",
    "portions felt thin",
];
