//! # 元素与同位素数据库
//!
//! 提供常用元素的标准密度、同位素天然丰度、同位素质量，以及中子截面模型参数。
//!
//! ## 截面模型
//! σ(E) = σ_s + σ_a · sqrt(0.0253 / E) + Σᵣ σ₀ᵣ · (Γᵣ/2)² / ((E - E₀ᵣ)² + (Γᵣ/2)²) · sqrt(E₀ᵣ / E)
//! - σ_s: 束缚散射截面 (b)
//! - σ_a: 热中子 (0.0253 eV) 吸收截面 (b)，按 1/v 外推
//! - 共振项: 单能级 Breit-Wigner 近似
//!
//! ## 数据来源
//! - 丰度与质量: IUPAC / AME 推荐值
//! - 热中子截面: Sears, Neutron News 3 (1992)
//! - 共振参数: 主要低能共振的近似峰值与宽度
//!
//! ## 依赖关系
//! - 被 `physics/formula.rs`, `physics/engine.rs`, `session/` 使用
//! - 纯静态数据，无外部依赖

use std::collections::HashMap;
use std::sync::LazyLock;

/// 热中子参考能量 (eV)
pub const THERMAL_ENERGY_EV: f64 = 0.0253;

/// 单能级共振参数
#[derive(Debug, Clone, Copy)]
pub struct Resonance {
    /// 共振能量 E₀ (eV)
    pub energy_ev: f64,
    /// 峰值截面 σ₀ (b)
    pub peak_b: f64,
    /// 总宽度 Γ (eV)
    pub width_ev: f64,
}

/// 同位素数据
#[derive(Debug, Clone)]
pub struct IsotopeData {
    /// 质量数 A
    pub mass_number: u32,
    /// 天然丰度（原子分数）
    pub abundance: f64,
    /// 原子质量 (u)
    pub mass: f64,
    /// 散射截面 (b)
    pub sigma_scatter: f64,
    /// 热中子吸收截面 (b)
    pub sigma_absorption: f64,
    pub resonances: Vec<Resonance>,
}

impl IsotopeData {
    fn with_resonances(mut self, params: &[(f64, f64, f64)]) -> Self {
        self.resonances = params
            .iter()
            .map(|&(energy_ev, peak_b, width_ev)| Resonance {
                energy_ev,
                peak_b,
                width_ev,
            })
            .collect();
        self
    }

    /// 给定能量 (eV) 下的总截面 (b)
    pub fn cross_section(&self, energy_ev: f64) -> f64 {
        if energy_ev <= 0.0 {
            return 0.0;
        }
        let mut sigma =
            self.sigma_scatter + self.sigma_absorption * (THERMAL_ENERGY_EV / energy_ev).sqrt();
        for r in &self.resonances {
            let half = r.width_ev / 2.0;
            let delta = energy_ev - r.energy_ev;
            sigma += r.peak_b * half * half / (delta * delta + half * half)
                * (r.energy_ev / energy_ev).sqrt();
        }
        sigma
    }
}

/// 同位素构造简写
fn iso(mass_number: u32, abundance: f64, mass: f64, sigma_scatter: f64, sigma_absorption: f64) -> IsotopeData {
    IsotopeData {
        mass_number,
        abundance,
        mass,
        sigma_scatter,
        sigma_absorption,
        resonances: Vec::new(),
    }
}

/// 元素数据
#[derive(Debug, Clone)]
pub struct ElementData {
    pub symbol: &'static str,
    pub name: &'static str,
    /// 标准状态固体密度 (g/cm³)；气体为 None
    pub density: Option<f64>,
    /// 同位素（按质量数升序）
    pub isotopes: Vec<IsotopeData>,
}

impl ElementData {
    /// 同位素符号，如 `107-Ag`
    pub fn isotope_symbol(&self, isotope: &IsotopeData) -> String {
        format!("{}-{}", isotope.mass_number, self.symbol)
    }

    /// 按符号查找同位素
    pub fn isotope(&self, isotope_symbol: &str) -> Option<&IsotopeData> {
        self.isotopes
            .iter()
            .find(|i| self.isotope_symbol(i) == isotope_symbol)
    }

    /// 天然丰度下的摩尔质量 (g/mol)
    pub fn natural_molar_mass(&self) -> f64 {
        self.isotopes.iter().map(|i| i.abundance * i.mass).sum()
    }

    /// 给定同位素比例下的摩尔质量 (g/mol)
    ///
    /// `ratios` 与 `isotopes` 一一对应；比例总和为 0 时回落到天然丰度。
    pub fn molar_mass_with_ratios(&self, ratios: &[f64]) -> f64 {
        let total: f64 = ratios.iter().sum();
        if total <= 0.0 {
            return self.natural_molar_mass();
        }
        self.isotopes
            .iter()
            .zip(ratios)
            .map(|(i, r)| i.mass * r / total)
            .sum()
    }
}

/// 元素数据库
pub static ELEMENTS: LazyLock<HashMap<&'static str, ElementData>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    let mut add = |symbol: &'static str, name: &'static str, density: Option<f64>, isotopes: Vec<IsotopeData>| {
        m.insert(
            symbol,
            ElementData {
                symbol,
                name,
                density,
                isotopes,
            },
        );
    };

    // 氢 (H)
    add(
        "H",
        "Hydrogen",
        None,
        vec![
            iso(1, 0.999885, 1.007825, 20.49, 0.3326),
            iso(2, 0.000115, 2.014102, 3.39, 0.000519),
        ],
    );

    // 锂 (Li)
    add(
        "Li",
        "Lithium",
        Some(0.534),
        vec![
            iso(6, 0.0759, 6.015122, 0.97, 940.0).with_resonances(&[(240_000.0, 11.0, 35_000.0)]),
            iso(7, 0.9241, 7.016004, 1.4, 0.0454),
        ],
    );

    // 铍 (Be)
    add("Be", "Beryllium", Some(1.85), vec![iso(9, 1.0, 9.012182, 7.63, 0.0076)]);

    // 硼 (B)
    add(
        "B",
        "Boron",
        Some(2.34),
        vec![
            iso(10, 0.199, 10.012937, 3.1, 3835.0),
            iso(11, 0.801, 11.009305, 5.77, 0.0055),
        ],
    );

    // 碳 (C)
    add(
        "C",
        "Carbon",
        Some(2.267),
        vec![
            iso(12, 0.9893, 12.0, 5.56, 0.00353),
            iso(13, 0.0107, 13.003355, 4.84, 0.00137),
        ],
    );

    // 氮 (N)
    add(
        "N",
        "Nitrogen",
        None,
        vec![
            iso(14, 0.99636, 14.003074, 11.51, 1.91),
            iso(15, 0.00364, 15.000109, 5.21, 0.000024),
        ],
    );

    // 氧 (O)
    add(
        "O",
        "Oxygen",
        None,
        vec![
            iso(16, 0.99757, 15.994915, 4.232, 0.0001),
            iso(17, 0.00038, 16.999132, 4.2, 0.236),
            iso(18, 0.00205, 17.99916, 4.29, 0.00016),
        ],
    );

    // 氟 (F)
    add("F", "Fluorine", None, vec![iso(19, 1.0, 18.998403, 4.018, 0.0096)]);

    // 钠 (Na)
    add(
        "Na",
        "Sodium",
        Some(0.968),
        vec![iso(23, 1.0, 22.98977, 3.28, 0.53).with_resonances(&[(2850.0, 380.0, 410.0)])],
    );

    // 镁 (Mg)
    add(
        "Mg",
        "Magnesium",
        Some(1.738),
        vec![
            iso(24, 0.7899, 23.985042, 4.03, 0.05),
            iso(25, 0.1, 24.985837, 2.6, 0.19),
            iso(26, 0.1101, 25.982593, 3.0, 0.0382),
        ],
    );

    // 铝 (Al)
    add(
        "Al",
        "Aluminum",
        Some(2.70),
        vec![iso(27, 1.0, 26.981538, 1.503, 0.231).with_resonances(&[(5905.0, 60.0, 12.0)])],
    );

    // 硅 (Si)
    add(
        "Si",
        "Silicon",
        Some(2.329),
        vec![
            iso(28, 0.92223, 27.976927, 2.12, 0.177),
            iso(29, 0.04685, 28.976495, 2.78, 0.101),
            iso(30, 0.03092, 29.97377, 2.64, 0.107),
        ],
    );

    // 磷 (P)
    add("P", "Phosphorus", Some(1.823), vec![iso(31, 1.0, 30.973762, 3.312, 0.172)]);

    // 硫 (S)
    add(
        "S",
        "Sulfur",
        Some(2.07),
        vec![
            iso(32, 0.9499, 31.972071, 0.988, 0.54),
            iso(33, 0.0075, 32.971458, 0.3, 0.54),
            iso(34, 0.0425, 33.967867, 1.52, 0.227),
            iso(36, 0.0001, 35.967081, 1.1, 0.15),
        ],
    );

    // 氯 (Cl)
    add(
        "Cl",
        "Chlorine",
        None,
        vec![
            iso(35, 0.7576, 34.968853, 21.8, 44.1).with_resonances(&[(398.0, 900.0, 25.0)]),
            iso(37, 0.2424, 36.965903, 1.19, 0.433),
        ],
    );

    // 钾 (K)
    add(
        "K",
        "Potassium",
        Some(0.862),
        vec![
            iso(39, 0.932581, 38.963707, 2.1, 2.1),
            iso(40, 0.000117, 39.963999, 2.0, 35.0),
            iso(41, 0.067302, 40.961826, 2.3, 1.46),
        ],
    );

    // 钙 (Ca)
    add(
        "Ca",
        "Calcium",
        Some(1.55),
        vec![
            iso(40, 0.96941, 39.962591, 3.0, 0.41),
            iso(42, 0.00647, 41.958618, 1.2, 0.68),
            iso(43, 0.00135, 42.958767, 7.0, 6.2),
            iso(44, 0.02086, 43.955481, 3.6, 0.88),
            iso(46, 0.00004, 45.953693, 0.5, 0.74),
            iso(48, 0.00187, 47.952534, 1.0, 1.09),
        ],
    );

    // 钛 (Ti)
    add(
        "Ti",
        "Titanium",
        Some(4.506),
        vec![
            iso(46, 0.0825, 45.952632, 3.05, 0.59),
            iso(47, 0.0744, 46.951763, 3.2, 1.7),
            iso(48, 0.7372, 47.947946, 4.65, 7.84),
            iso(49, 0.0541, 48.94787, 3.4, 2.2),
            iso(50, 0.0518, 49.944791, 4.8, 0.179),
        ],
    );

    // 钒 (V)
    add(
        "V",
        "Vanadium",
        Some(6.0),
        vec![
            iso(50, 0.0025, 49.947163, 7.3, 60.0),
            iso(51, 0.9975, 50.943964, 5.09, 4.9),
        ],
    );

    // 铬 (Cr)
    add(
        "Cr",
        "Chromium",
        Some(7.19),
        vec![
            iso(50, 0.04345, 49.94605, 2.54, 15.8),
            iso(52, 0.83789, 51.940512, 3.042, 0.76),
            iso(53, 0.09501, 52.940654, 2.93, 18.1),
            iso(54, 0.02365, 53.938885, 2.6, 0.36),
        ],
    );

    // 锰 (Mn)
    add(
        "Mn",
        "Manganese",
        Some(7.21),
        vec![iso(55, 1.0, 54.93805, 2.15, 13.3).with_resonances(&[(336.0, 2200.0, 22.0)])],
    );

    // 铁 (Fe)
    add(
        "Fe",
        "Iron",
        Some(7.874),
        vec![
            iso(54, 0.05845, 53.939615, 2.2, 2.25),
            iso(56, 0.91754, 55.934942, 12.42, 2.59).with_resonances(&[(1148.0, 800.0, 55.0)]),
            iso(57, 0.02119, 56.935399, 1.0, 2.48),
            iso(58, 0.00282, 57.93328, 28.0, 1.28),
        ],
    );

    // 钴 (Co)
    add(
        "Co",
        "Cobalt",
        Some(8.9),
        vec![iso(59, 1.0, 58.9332, 5.6, 37.18).with_resonances(&[(132.0, 9500.0, 5.0)])],
    );

    // 镍 (Ni)
    add(
        "Ni",
        "Nickel",
        Some(8.908),
        vec![
            iso(58, 0.680769, 57.935348, 26.1, 4.6),
            iso(60, 0.262231, 59.930791, 0.99, 2.9),
            iso(61, 0.011399, 60.93106, 9.0, 2.5),
            iso(62, 0.036345, 61.928349, 9.5, 14.5),
            iso(64, 0.009256, 63.92797, 0.017, 1.52),
        ],
    );

    // 铜 (Cu)
    add(
        "Cu",
        "Copper",
        Some(8.96),
        vec![
            iso(63, 0.6915, 62.929601, 5.2, 4.5).with_resonances(&[(579.0, 600.0, 30.0)]),
            iso(65, 0.3085, 64.927794, 14.5, 2.17).with_resonances(&[(230.0, 900.0, 10.0)]),
        ],
    );

    // 锌 (Zn)
    add(
        "Zn",
        "Zinc",
        Some(7.14),
        vec![
            iso(64, 0.4917, 63.929147, 3.42, 0.93),
            iso(66, 0.2773, 65.926037, 4.48, 0.62),
            iso(67, 0.0404, 66.927131, 7.18, 6.8),
            iso(68, 0.1845, 67.924848, 4.57, 1.1),
            iso(70, 0.0061, 69.925325, 4.5, 0.092),
        ],
    );

    // 硒 (Se)
    add(
        "Se",
        "Selenium",
        Some(4.81),
        vec![
            iso(74, 0.0089, 73.922476, 8.3, 51.8),
            iso(76, 0.0937, 75.919214, 8.3, 85.0),
            iso(77, 0.0763, 76.919914, 8.3, 42.0),
            iso(78, 0.2377, 77.917309, 8.3, 0.43),
            iso(80, 0.4961, 79.916521, 8.3, 0.61),
            iso(82, 0.0873, 81.916699, 8.3, 0.044),
        ],
    );

    // 溴 (Br)
    add(
        "Br",
        "Bromine",
        Some(3.12),
        vec![
            iso(79, 0.5069, 78.918338, 5.9, 11.0).with_resonances(&[(35.8, 1700.0, 0.15)]),
            iso(81, 0.4931, 80.916291, 5.8, 2.7).with_resonances(&[(101.1, 600.0, 0.2)]),
        ],
    );

    // 锶 (Sr)
    add(
        "Sr",
        "Strontium",
        Some(2.64),
        vec![
            iso(84, 0.0056, 83.913425, 6.25, 0.87),
            iso(86, 0.0986, 85.90926, 6.25, 1.04),
            iso(87, 0.07, 86.908877, 6.25, 16.0),
            iso(88, 0.8258, 87.905612, 6.25, 0.058),
        ],
    );

    // 锆 (Zr)
    add(
        "Zr",
        "Zirconium",
        Some(6.52),
        vec![
            iso(90, 0.5145, 89.904704, 5.1, 0.011),
            iso(91, 0.1122, 90.905645, 9.5, 1.17),
            iso(92, 0.1715, 91.90504, 6.9, 0.22),
            iso(94, 0.1738, 93.906316, 8.4, 0.0499),
            iso(96, 0.028, 95.908276, 3.8, 0.0229),
        ],
    );

    // 铌 (Nb)
    add(
        "Nb",
        "Niobium",
        Some(8.57),
        vec![iso(93, 1.0, 92.906378, 6.25, 1.15).with_resonances(&[(35.9, 1900.0, 0.12)])],
    );

    // 钼 (Mo)
    add(
        "Mo",
        "Molybdenum",
        Some(10.28),
        vec![
            iso(92, 0.1453, 91.90681, 6.0, 0.019),
            iso(94, 0.0915, 93.905088, 6.0, 0.015),
            iso(95, 0.1584, 94.905842, 6.0, 13.1).with_resonances(&[(44.9, 5000.0, 0.2)]),
            iso(96, 0.1667, 95.904679, 6.0, 0.5),
            iso(97, 0.096, 96.906021, 6.0, 2.5),
            iso(98, 0.2439, 97.905408, 6.0, 0.127),
            iso(100, 0.0982, 99.907477, 6.0, 0.4),
        ],
    );

    // 铑 (Rh)
    add(
        "Rh",
        "Rhodium",
        Some(12.41),
        vec![iso(103, 1.0, 102.905504, 4.6, 144.8).with_resonances(&[(1.26, 5000.0, 0.16)])],
    );

    // 钯 (Pd)
    add(
        "Pd",
        "Palladium",
        Some(12.02),
        vec![
            iso(102, 0.0102, 101.905609, 4.5, 3.4),
            iso(104, 0.1114, 103.904036, 4.5, 0.6),
            iso(105, 0.2233, 104.905085, 4.5, 20.0).with_resonances(&[(11.8, 10000.0, 0.15)]),
            iso(106, 0.2733, 105.903486, 4.5, 0.304),
            iso(108, 0.2646, 107.903892, 4.5, 8.55).with_resonances(&[(33.0, 4000.0, 0.14)]),
            iso(110, 0.1172, 109.905153, 4.5, 0.226),
        ],
    );

    // 银 (Ag)
    add(
        "Ag",
        "Silver",
        Some(10.49),
        vec![
            iso(107, 0.51839, 106.905097, 7.17, 37.6)
                .with_resonances(&[(16.3, 8000.0, 0.14), (41.6, 2000.0, 0.15)]),
            iso(109, 0.48161, 108.904752, 2.3, 91.0)
                .with_resonances(&[(5.19, 12000.0, 0.14), (30.6, 1200.0, 0.15)]),
        ],
    );

    // 镉 (Cd)
    add(
        "Cd",
        "Cadmium",
        Some(8.65),
        vec![
            iso(106, 0.0125, 105.906459, 5.1, 1.0),
            iso(108, 0.0089, 107.904184, 5.1, 1.1),
            iso(110, 0.1249, 109.903002, 5.1, 11.0),
            iso(111, 0.128, 110.904178, 5.1, 24.0),
            iso(112, 0.2413, 111.902758, 5.1, 2.2),
            iso(113, 0.1222, 112.904402, 12.4, 20600.0).with_resonances(&[(0.178, 57000.0, 0.113)]),
            iso(114, 0.2873, 113.903358, 5.1, 0.34),
            iso(116, 0.0749, 115.904756, 5.1, 0.075),
        ],
    );

    // 铟 (In)
    add(
        "In",
        "Indium",
        Some(7.31),
        vec![
            iso(113, 0.0429, 112.904058, 3.65, 12.0).with_resonances(&[(14.6, 5000.0, 0.1)]),
            iso(115, 0.9571, 114.903878, 2.02, 202.0).with_resonances(&[
                (1.457, 28000.0, 0.075),
                (3.82, 2000.0, 0.08),
                (9.07, 2500.0, 0.09),
            ]),
        ],
    );

    // 锡 (Sn)
    add(
        "Sn",
        "Tin",
        Some(7.287),
        vec![
            iso(112, 0.0097, 111.904818, 4.9, 1.0),
            iso(114, 0.0066, 113.902779, 4.9, 0.114),
            iso(115, 0.0034, 114.903342, 4.9, 30.0),
            iso(116, 0.1454, 115.901741, 4.42, 0.14),
            iso(117, 0.0768, 116.902952, 5.28, 2.3),
            iso(118, 0.2422, 117.901603, 4.63, 0.22),
            iso(119, 0.0859, 118.903308, 4.71, 2.2),
            iso(120, 0.3258, 119.902195, 4.03, 0.14),
            iso(122, 0.0463, 121.90344, 3.52, 0.18),
            iso(124, 0.0579, 123.905274, 4.48, 0.133),
        ],
    );

    // 碘 (I)
    add(
        "I",
        "Iodine",
        Some(4.93),
        vec![iso(127, 1.0, 126.904473, 3.81, 6.15)
            .with_resonances(&[(20.4, 1800.0, 0.13), (37.6, 1200.0, 0.1)])],
    );

    // 钡 (Ba)
    add(
        "Ba",
        "Barium",
        Some(3.51),
        vec![
            iso(130, 0.00106, 129.906321, 3.4, 11.3),
            iso(132, 0.00101, 131.905061, 3.4, 7.0),
            iso(134, 0.02417, 133.904508, 3.4, 2.0),
            iso(135, 0.06592, 134.905689, 3.4, 5.8),
            iso(136, 0.07854, 135.904576, 3.4, 0.68),
            iso(137, 0.11232, 136.905827, 3.4, 3.6),
            iso(138, 0.71698, 137.905247, 3.4, 0.27),
        ],
    );

    // 镧 (La)
    add(
        "La",
        "Lanthanum",
        Some(6.146),
        vec![
            iso(138, 0.0008881, 137.907112, 9.66, 57.0),
            iso(139, 0.9991119, 138.906353, 9.66, 8.97).with_resonances(&[(72.2, 1200.0, 0.2)]),
        ],
    );

    // 钐 (Sm)
    add(
        "Sm",
        "Samarium",
        Some(7.52),
        vec![
            iso(144, 0.0307, 143.911999, 0.7, 0.7),
            iso(147, 0.1499, 146.914898, 14.0, 57.0).with_resonances(&[(3.4, 12000.0, 0.11)]),
            iso(148, 0.1124, 147.914823, 2.1, 2.4),
            iso(149, 0.1382, 148.917185, 200.0, 42080.0)
                .with_resonances(&[(0.0973, 150000.0, 0.063)]),
            iso(150, 0.0738, 149.917276, 25.0, 104.0),
            iso(152, 0.2675, 151.919732, 3.1, 206.0).with_resonances(&[(8.03, 90000.0, 0.09)]),
            iso(154, 0.2275, 153.922209, 11.0, 8.4),
        ],
    );

    // 铕 (Eu)
    add(
        "Eu",
        "Europium",
        Some(5.24),
        vec![
            iso(151, 0.4781, 150.919846, 8.0, 9200.0).with_resonances(&[(0.321, 15000.0, 0.08)]),
            iso(153, 0.5219, 152.921226, 8.0, 312.0).with_resonances(&[(2.46, 4000.0, 0.1)]),
        ],
    );

    // 钆 (Gd)
    add(
        "Gd",
        "Gadolinium",
        Some(7.9),
        vec![
            iso(152, 0.002, 151.919791, 6.0, 735.0),
            iso(154, 0.0218, 153.920866, 6.0, 85.0),
            iso(155, 0.148, 154.922622, 6.0, 61100.0).with_resonances(&[(2.01, 3000.0, 0.11)]),
            iso(156, 0.2047, 155.922123, 6.0, 1.5),
            iso(157, 0.1565, 156.92396, 6.0, 259000.0).with_resonances(&[(2.83, 3500.0, 0.1)]),
            iso(158, 0.2484, 157.924104, 6.0, 2.2),
            iso(160, 0.2186, 159.927054, 6.0, 0.77),
        ],
    );

    // 铽 (Tb)
    add(
        "Tb",
        "Terbium",
        Some(8.23),
        vec![iso(159, 1.0, 158.925347, 6.84, 23.4).with_resonances(&[(3.35, 9000.0, 0.1)])],
    );

    // 镝 (Dy)
    add(
        "Dy",
        "Dysprosium",
        Some(8.55),
        vec![
            iso(156, 0.00056, 155.924283, 5.0, 33.0),
            iso(158, 0.00095, 157.924409, 5.0, 43.0),
            iso(160, 0.02329, 159.925198, 5.0, 56.0),
            iso(161, 0.18889, 160.926933, 3.0, 600.0).with_resonances(&[(2.71, 20000.0, 0.13)]),
            iso(162, 0.25475, 161.926798, 0.25, 194.0).with_resonances(&[(5.44, 25000.0, 0.12)]),
            iso(163, 0.24896, 162.928731, 3.1, 124.0).with_resonances(&[(1.71, 25000.0, 0.12)]),
            iso(164, 0.2826, 163.929175, 307.0, 2840.0),
        ],
    );

    // 钬 (Ho)
    add(
        "Ho",
        "Holmium",
        Some(8.8),
        vec![iso(165, 1.0, 164.930322, 8.42, 64.7).with_resonances(&[(3.92, 20000.0, 0.1)])],
    );

    // 铒 (Er)
    add(
        "Er",
        "Erbium",
        Some(9.07),
        vec![
            iso(162, 0.00139, 161.928778, 8.7, 19.0),
            iso(164, 0.01601, 163.9292, 8.7, 13.0),
            iso(166, 0.33503, 165.930293, 8.7, 19.6),
            iso(167, 0.22869, 166.932048, 8.7, 659.0).with_resonances(&[(0.46, 12000.0, 0.1)]),
            iso(168, 0.26978, 167.93237, 8.7, 2.74),
            iso(170, 0.1491, 169.935464, 8.7, 5.8),
        ],
    );

    // 铪 (Hf)
    add(
        "Hf",
        "Hafnium",
        Some(13.31),
        vec![
            iso(174, 0.0016, 173.940046, 10.0, 561.0),
            iso(176, 0.0526, 175.941409, 10.0, 23.5),
            iso(177, 0.186, 176.94322, 10.0, 373.0).with_resonances(&[(1.098, 7000.0, 0.11)]),
            iso(178, 0.2728, 177.943699, 10.0, 84.0).with_resonances(&[(7.78, 10000.0, 0.06)]),
            iso(179, 0.1362, 178.945816, 10.0, 41.0).with_resonances(&[(5.69, 4000.0, 0.07)]),
            iso(180, 0.3508, 179.94655, 10.0, 13.04),
        ],
    );

    // 钽 (Ta)
    add(
        "Ta",
        "Tantalum",
        Some(16.69),
        vec![
            iso(180, 0.00012, 179.947465, 6.0, 563.0),
            iso(181, 0.99988, 180.947996, 6.0, 20.5).with_resonances(&[
                (4.28, 7000.0, 0.06),
                (10.36, 3500.0, 0.05),
                (13.95, 1500.0, 0.06),
            ]),
        ],
    );

    // 钨 (W)
    add(
        "W",
        "Tungsten",
        Some(19.25),
        vec![
            iso(180, 0.0012, 179.946704, 4.6, 30.0),
            iso(182, 0.265, 181.948204, 4.6, 20.7).with_resonances(&[(4.15, 14000.0, 0.07)]),
            iso(183, 0.1431, 182.950223, 4.6, 10.1).with_resonances(&[(7.6, 3500.0, 0.08)]),
            iso(184, 0.3064, 183.950931, 4.6, 1.7),
            iso(186, 0.2843, 185.954364, 4.6, 37.9).with_resonances(&[(18.8, 12000.0, 0.35)]),
        ],
    );

    // 铼 (Re)
    add(
        "Re",
        "Rhenium",
        Some(21.02),
        vec![
            iso(185, 0.374, 184.952955, 11.5, 112.0).with_resonances(&[(2.16, 10000.0, 0.06)]),
            iso(187, 0.626, 186.955753, 11.5, 76.4).with_resonances(&[(4.4, 8000.0, 0.06)]),
        ],
    );

    // 铱 (Ir)
    add(
        "Ir",
        "Iridium",
        Some(22.56),
        vec![
            iso(191, 0.373, 190.960594, 14.0, 954.0).with_resonances(&[(0.654, 50000.0, 0.08)]),
            iso(193, 0.627, 192.962926, 14.0, 111.0).with_resonances(&[(1.303, 26000.0, 0.08)]),
        ],
    );

    // 铂 (Pt)
    add(
        "Pt",
        "Platinum",
        Some(21.45),
        vec![
            iso(190, 0.00012, 189.95993, 11.7, 10.0),
            iso(192, 0.00782, 191.961038, 11.7, 10.0),
            iso(194, 0.3286, 193.96268, 11.7, 1.44),
            iso(195, 0.3378, 194.964791, 11.7, 27.5).with_resonances(&[(11.9, 9000.0, 0.12)]),
            iso(196, 0.2521, 195.964951, 11.7, 0.72),
            iso(198, 0.07356, 197.967893, 11.7, 3.66),
        ],
    );

    // 金 (Au)
    add(
        "Au",
        "Gold",
        Some(19.3),
        vec![iso(197, 1.0, 196.966552, 7.32, 98.65)
            .with_resonances(&[(4.906, 30000.0, 0.137), (60.3, 1800.0, 0.2)])],
    );

    // 汞 (Hg)
    add(
        "Hg",
        "Mercury",
        Some(13.534),
        vec![
            iso(196, 0.0015, 195.965833, 20.0, 3080.0),
            iso(198, 0.0997, 197.966769, 20.0, 2.0),
            iso(199, 0.1687, 198.96828, 20.0, 2150.0).with_resonances(&[(34.5, 4000.0, 0.6)]),
            iso(200, 0.231, 199.968326, 20.0, 60.0),
            iso(201, 0.1318, 200.970302, 20.0, 7.8),
            iso(202, 0.2986, 201.970643, 20.0, 4.89),
            iso(204, 0.0687, 203.973494, 20.0, 0.43),
        ],
    );

    // 铅 (Pb)
    add(
        "Pb",
        "Lead",
        Some(11.34),
        vec![
            iso(204, 0.014, 203.973029, 11.1, 0.65),
            iso(206, 0.241, 205.974449, 11.1, 0.03),
            iso(207, 0.221, 206.975881, 11.1, 0.699),
            iso(208, 0.524, 207.976636, 11.1, 0.00048),
        ],
    );

    // 铋 (Bi)
    add("Bi", "Bismuth", Some(9.78), vec![iso(209, 1.0, 208.980383, 9.15, 0.0338)]);

    // 钍 (Th)
    add(
        "Th",
        "Thorium",
        Some(11.7),
        vec![iso(232, 1.0, 232.038055, 13.36, 7.37)
            .with_resonances(&[(21.78, 8000.0, 0.04), (23.45, 9000.0, 0.04)])],
    );

    // 铀 (U)
    add(
        "U",
        "Uranium",
        Some(19.1),
        vec![
            iso(234, 0.000054, 234.040946, 19.0, 100.1),
            iso(235, 0.007204, 235.043923, 14.0, 680.9).with_resonances(&[(8.77, 1500.0, 0.1)]),
            iso(238, 0.992742, 238.050783, 9.08, 2.68).with_resonances(&[
                (6.67, 22000.0, 0.025),
                (20.87, 10000.0, 0.034),
                (36.68, 8000.0, 0.057),
            ]),
        ],
    );

    m
});

/// 获取元素数据
pub fn get_element(symbol: &str) -> Option<&'static ElementData> {
    ELEMENTS.get(symbol)
}

/// 元素的标准密度（气体或未知元素返回 None）
pub fn standard_density(symbol: &str) -> Option<f64> {
    get_element(symbol).and_then(|e| e.density)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_abundances_sum_to_one() {
        for (symbol, element) in ELEMENTS.iter() {
            let total: f64 = element.isotopes.iter().map(|i| i.abundance).sum();
            assert!(
                (total - 1.0).abs() < 1e-6,
                "{} abundances sum to {}",
                symbol,
                total
            );
        }
    }

    #[test]
    fn test_silver_molar_mass() {
        let ag = get_element("Ag").unwrap();
        assert!((ag.natural_molar_mass() - 107.868).abs() < 0.01);
        assert_eq!(standard_density("Ag"), Some(10.49));
        assert_eq!(standard_density("O"), None);
    }

    #[test]
    fn test_resonance_peak_dominates() {
        let au = get_element("Au").unwrap();
        let au197 = au.isotope("197-Au").unwrap();
        let on_peak = au197.cross_section(4.906);
        let off_peak = au197.cross_section(3.0);
        assert!(on_peak > 20000.0, "peak cross-section too small: {}", on_peak);
        assert!(on_peak > 50.0 * off_peak);
    }

    #[test]
    fn test_common_resonance_absorbers_present() {
        for symbol in ["Sm", "Dy", "Er", "Ir", "Rh", "Pd", "Pt", "Hg", "I", "Br", "Th"] {
            assert!(get_element(symbol).is_some(), "{} missing from the table", symbol);
        }
        let formula = crate::physics::formula::parse_formula("AgBr").unwrap();
        assert_eq!(formula.count_of("Br"), Some(1.0));

        let sm149 = get_element("Sm").unwrap().isotope("149-Sm").unwrap();
        assert!(sm149.cross_section(0.0973) > 100000.0);
    }

    #[test]
    fn test_molar_mass_with_enriched_ratios() {
        let b = get_element("B").unwrap();
        let enriched = b.molar_mass_with_ratios(&[1.0, 0.0]);
        assert!((enriched - 10.012937).abs() < 1e-9);
        let fallback = b.molar_mass_with_ratios(&[0.0, 0.0]);
        assert!((fallback - b.natural_molar_mass()).abs() < 1e-12);
    }
}
