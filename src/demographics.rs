//! Code tables for the WVS Turkey demographic variables.
//!
//! Turkish labels describe personas; English slices drive tabulation. Codes
//! not listed, including the `-1`/`-2` non-response codes, map to nothing.

pub const GENDER: &str = "Q260";
pub const AGE: &str = "Q262";
pub const MARITAL_STATUS: &str = "Q273";
pub const CHILDREN: &str = "Q274";
pub const EDUCATION: &str = "Q275A";
pub const EMPLOYMENT: &str = "Q279";
pub const SOCIAL_CLASS: &str = "Q287";
pub const SETTLEMENT: &str = "H_URBRURAL";
pub const REGION: &str = "N_REGION_WVS";

/// Persona attribute, in output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Gender,
    AgeGroup,
    MaritalStatus,
    Children,
    Education,
    Employment,
    SocialClass,
    Settlement,
    Region,
}

impl Attribute {
    pub const ALL: [Attribute; 9] = [
        Attribute::Gender,
        Attribute::AgeGroup,
        Attribute::MaritalStatus,
        Attribute::Children,
        Attribute::Education,
        Attribute::Employment,
        Attribute::SocialClass,
        Attribute::Settlement,
        Attribute::Region,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            Attribute::Gender => "Cinsiyet",
            Attribute::AgeGroup => "Yaş Grubu",
            Attribute::MaritalStatus => "Medeni Durum",
            Attribute::Children => "Çocuk Sahipliği",
            Attribute::Education => "Eğitim Düzeyi",
            Attribute::Employment => "İş Durumu",
            Attribute::SocialClass => "Sosyal Sınıf",
            Attribute::Settlement => "Yerleşim Yeri",
            Attribute::Region => "Bölge",
        }
    }

    pub fn variable(self) -> &'static str {
        match self {
            Attribute::Gender => GENDER,
            Attribute::AgeGroup => AGE,
            Attribute::MaritalStatus => MARITAL_STATUS,
            Attribute::Children => CHILDREN,
            Attribute::Education => EDUCATION,
            Attribute::Employment => EMPLOYMENT,
            Attribute::SocialClass => SOCIAL_CLASS,
            Attribute::Settlement => SETTLEMENT,
            Attribute::Region => REGION,
        }
    }

    pub fn label(self, code: i64) -> Option<&'static str> {
        match self {
            Attribute::Gender => gender_tr(code),
            Attribute::AgeGroup => age_group_tr(code),
            Attribute::MaritalStatus => marital_status_tr(code),
            Attribute::Children => children_tr(code),
            Attribute::Education => education_tr(code),
            Attribute::Employment => employment_tr(code),
            Attribute::SocialClass => social_class_tr(code),
            Attribute::Settlement => settlement_tr(code),
            Attribute::Region => region_tr(code),
        }
    }

    /// Every label the attribute can take, in code order.
    pub fn labels(self) -> Vec<&'static str> {
        let codes: Vec<i64> = match self {
            Attribute::Gender | Attribute::Settlement => (1..=2).collect(),
            Attribute::AgeGroup => vec![0, 30, 50],
            Attribute::MaritalStatus => (1..=6).collect(),
            Attribute::Children => vec![0, 1],
            Attribute::Education => (792001..=792024).collect(),
            Attribute::Employment => (1..=8).collect(),
            Attribute::SocialClass => (1..=5).collect(),
            Attribute::Region => (792101..=792126).collect(),
        };
        let mut labels: Vec<&'static str> = codes.into_iter().filter_map(|c| self.label(c)).collect();
        labels.dedup();
        labels
    }
}

pub const AGE_UNDER_30: &str = "30 yaşından küçük";
pub const AGE_30_TO_49: &str = "30-50 yaş arası";
pub const AGE_50_PLUS: &str = "50 yaşında veya daha yaşlı";

pub fn gender_tr(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("Erkek"),
        2 => Some("Kadın"),
        _ => None,
    }
}

pub fn age_group_tr(age: i64) -> Option<&'static str> {
    match age {
        a if a < 0 => None,
        0..=29 => Some(AGE_UNDER_30),
        30..=49 => Some(AGE_30_TO_49),
        _ => Some(AGE_50_PLUS),
    }
}

pub fn marital_status_tr(code: i64) -> Option<&'static str> {
    match code {
        1 | 2 => Some("Evli"),
        3..=6 => Some("Bekâr"),
        _ => None,
    }
}

pub fn children_tr(count: i64) -> Option<&'static str> {
    match count {
        c if c < 0 => None,
        0 => Some("Çocuğu yok"),
        _ => Some("Çocuk sahibi"),
    }
}

pub fn education_tr(code: i64) -> Option<&'static str> {
    match code {
        792001 => Some("Hiç okula gitmemiş"),
        792014 => Some("İlkokul terk"),
        792015 | 792016 => Some("İlkokul mezunu"),
        792017 | 792018 => Some("Ortaokul mezunu"),
        792019 | 792020 => Some("Lise mezunu"),
        792021 => Some("Üniversite mezunu"),
        792023 | 792024 => Some("Şu anda öğrenci"),
        _ => None,
    }
}

pub fn employment_tr(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("Ücretli ve tam zamanlı çalışan"),
        2 => Some("Ücretli ve yarı zamanlı çalışan"),
        3 => Some("Kendi işinin sahibi"),
        4 => Some("Emekli"),
        5 => Some("Ev kadını"),
        6 => Some("Öğrenci"),
        7 => Some("İşsiz/iş arayan"),
        8 => Some("Diğer"),
        _ => None,
    }
}

pub fn social_class_tr(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("Üst sınıf"),
        2 => Some("Orta sınıfın üst kısmında"),
        3 => Some("Orta sınıfın alt kısmında"),
        4 => Some("Çalışan, işçi, emekçi sınıfı"),
        5 => Some("Alt sınıf"),
        _ => None,
    }
}

pub fn settlement_tr(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("Kent merkezinde"),
        2 => Some("Kırsal alanda"),
        _ => None,
    }
}

pub fn region_tr(code: i64) -> Option<&'static str> {
    let label = match code {
        792101 => "TR10: İstanbul",
        792102 => "TR21: Tekirdağ, Edirne, Kırklareli",
        792103 => "TR22: Balıkesir, Çanakkale",
        792104 => "TR31: İzmir",
        792105 => "TR32: Aydın, Denizli, Muğla",
        792106 => "TR33: Manisa, Afyon, Kütahya, Uşak",
        792107 => "TR41: Bursa, Eskişehir, Bilecik",
        792108 => "TR42: Kocaeli, Sakarya, Düzce, Bolu, Yalova",
        792109 => "TR51: Ankara",
        792110 => "TR52: Konya, Karaman",
        792111 => "TR61: Antalya, Isparta, Burdur",
        792112 => "TR62: Adana, Mersin",
        792113 => "TR63: Hatay, Kahramanmaraş, Osmaniye",
        792114 => "TR71: Kırıkkale, Aksaray, Niğde, Kırşehir, Nevşehir",
        792115 => "TR72: Kayseri, Sivas, Yozgat",
        792116 => "TR81: Zonguldak, Karabük, Bartın",
        792117 => "TR82: Kastamonu, Çankırı, Sinop",
        792118 => "TR83: Samsun, Tokat, Çorum, Amasya",
        792119 => "TR90: Trabzon, Ordu, Giresun, Rize, Artvin, Gümüşhane",
        792120 => "TRA1: Erzurum, Erzincan, Bayburt",
        792121 => "TRA2: Ağrı, Kars, Iğdır, Ardahan",
        792122 => "TRB1: Malatya, Elazığ, Bingöl, Tunceli",
        792123 => "TRB2: Van, Muş, Bitlis, Hakkari",
        792124 => "TRC1: Gaziantep, Adıyaman, Kilis",
        792125 => "TRC2: Şanlıurfa, Diyarbakır",
        792126 => "TRC3: Mardin, Batman, Şırnak, Siirt",
        _ => return None,
    };
    Some(label)
}

/// Cities named in a region label such as `"TR22: Balıkesir, Çanakkale"`.
pub fn region_cities(region: &str) -> Vec<&str> {
    let cities = region.split_once(": ").map(|(_, c)| c).unwrap_or(region);
    cities.split(", ").map(str::trim).filter(|c| !c.is_empty()).collect()
}

/// A respondent subgroup used as a tabulation column.
#[derive(Debug, Clone, Copy)]
pub struct Slice {
    pub name: &'static str,
    pub variable: &'static str,
    matches: fn(i64) -> bool,
}

impl Slice {
    pub fn contains(&self, value: i64) -> bool {
        (self.matches)(value)
    }
}

pub const TABULATION_SLICES: [Slice; 13] = [
    Slice { name: "Male", variable: GENDER, matches: |v| v == 1 },
    Slice { name: "Female", variable: GENDER, matches: |v| v == 2 },
    Slice { name: "Up to 29", variable: AGE, matches: |v| (0..=29).contains(&v) },
    Slice { name: "30-49", variable: AGE, matches: |v| (30..=49).contains(&v) },
    Slice { name: "50 and more", variable: AGE, matches: |v| v >= 50 },
    Slice { name: "Married", variable: MARITAL_STATUS, matches: |v| v == 1 },
    Slice { name: "Single", variable: MARITAL_STATUS, matches: |v| v == 6 },
    Slice { name: "Divorced", variable: MARITAL_STATUS, matches: |v| v == 3 },
    Slice { name: "No children", variable: CHILDREN, matches: |v| v == 0 },
    Slice { name: "1 child", variable: CHILDREN, matches: |v| v == 1 },
    Slice { name: "2 children", variable: CHILDREN, matches: |v| v == 2 },
    Slice { name: "3 children", variable: CHILDREN, matches: |v| v == 3 },
    Slice { name: "4 or more children", variable: CHILDREN, matches: |v| v >= 4 },
];
