use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Уникальный идентификатор модели
pub type ModelId = String;

/// Сырые параметры в том виде, в каком их прислал клиент
pub type RawParameters = serde_json::Map<String, serde_json::Value>;

/// Категория компонента самолёта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCategory {
    Wing,
    Fuselage,
    Engine,
}

impl ComponentCategory {
    /// Все категории в порядке сборки
    pub const ALL: [ComponentCategory; 3] = [
        ComponentCategory::Fuselage,
        ComponentCategory::Wing,
        ComponentCategory::Engine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentCategory::Wing => "wing",
            ComponentCategory::Fuselage => "fuselage",
            ComponentCategory::Engine => "engine",
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ошибка разбора категории из строки
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown component category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for ComponentCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wing" | "wings" => Ok(ComponentCategory::Wing),
            "fuselage" => Ok(ComponentCategory::Fuselage),
            "engine" => Ok(ComponentCategory::Engine),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

fn default_wing_type() -> String {
    "straight".to_string()
}

/// Канонический набор параметров компонента.
///
/// Поля разбиты на группы: крыло, фюзеляж, двигатель и подсказки размещения.
/// Проверяется один раз при нормализации, дальше передаётся только по ссылке.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AeroParameters {
    // ── Крыло ──
    /// Тип крыла (straight, swept, delta, ...)
    #[serde(default = "default_wing_type")]
    pub wing_type: String,
    /// Полный размах
    pub span: f64,
    /// Корневая хорда
    pub root_chord: f64,
    /// Концевая хорда (None = как корневая)
    #[serde(default)]
    pub tip_chord: Option<f64>,
    /// Стреловидность по передней кромке, градусы
    #[serde(default)]
    pub sweep_angle: f64,
    /// Относительная толщина профиля, % хорды
    pub thickness: f64,
    /// Угол поперечного V, градусы
    #[serde(default)]
    pub dihedral: f64,

    // ── Фюзеляж ──
    #[serde(default)]
    pub fuselage_type: Option<String>,
    #[serde(default)]
    pub fuselage_length: Option<f64>,
    #[serde(default)]
    pub fuselage_diameter: Option<f64>,
    #[serde(default)]
    pub has_vertical_stabilizer: bool,
    #[serde(default)]
    pub has_horizontal_stabilizer: bool,

    // ── Двигатель ──
    #[serde(default)]
    pub engine_length: Option<f64>,
    #[serde(default)]
    pub engine_diameter: Option<f64>,

    // ── Подсказки размещения ──
    #[serde(default)]
    pub position_x: f64,
    #[serde(default)]
    pub position_y: f64,
    #[serde(default)]
    pub position_z: f64,
}

impl Default for AeroParameters {
    /// Консервативный набор по умолчанию: прямое крыло 10 x 1, профиль 12%
    fn default() -> Self {
        Self {
            wing_type: default_wing_type(),
            span: 10.0,
            root_chord: 1.0,
            tip_chord: None,
            sweep_angle: 0.0,
            thickness: 12.0,
            dihedral: 0.0,
            fuselage_type: None,
            fuselage_length: None,
            fuselage_diameter: None,
            has_vertical_stabilizer: false,
            has_horizontal_stabilizer: false,
            engine_length: None,
            engine_diameter: None,
            position_x: 0.0,
            position_y: 0.0,
            position_z: 0.0,
        }
    }
}

impl AeroParameters {
    /// Средняя хорда: (корневая + концевая) / 2
    pub fn mean_chord(&self) -> f64 {
        let tip = self.tip_chord.unwrap_or(self.root_chord);
        (self.root_chord + tip) / 2.0
    }

    /// Длина и диаметр фюзеляжа, если оба заданы и не равны нулю
    pub fn fuselage_dimensions(&self) -> Option<(f64, f64)> {
        nonzero_pair(self.fuselage_length, self.fuselage_diameter)
    }

    /// Длина и диаметр двигателя, если оба заданы и не равны нулю
    pub fn engine_dimensions(&self) -> Option<(f64, f64)> {
        nonzero_pair(self.engine_length, self.engine_diameter)
    }
}

fn nonzero_pair(a: Option<f64>, b: Option<f64>) -> Option<(f64, f64)> {
    match (a, b) {
        (Some(a), Some(b)) if a != 0.0 && b != 0.0 => Some((a, b)),
        _ => None,
    }
}

/// Смещение точки крепления относительно фюзеляжа
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Offset3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Offset3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Смещения крепления симметричных компонентов (по умолчанию начало координат)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AttachmentOffsets {
    #[serde(default)]
    pub wing: Offset3,
    #[serde(default)]
    pub engine: Offset3,
}

/// Плоское (транспортное) представление сетки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeometryRecord {
    /// x, y, z подряд для каждой вершины
    pub vertices: Vec<f64>,
    /// Тройки индексов вершин
    pub indices: Vec<u32>,
    /// Нормали вершин (x, y, z подряд), если есть
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normals: Option<Vec<f64>>,
}

/// Происхождение модели
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Manual,
    #[default]
    Text,
    Compilation,
}

/// Каким способом получен объём
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeMethod {
    /// Замкнутая сетка: точный объём
    Enclosed,
    /// Незамкнутая сетка: объём выпуклой оболочки
    ConvexHull,
    /// Вырожденная сетка: аналитическая формула
    ClosedForm,
}

/// Запасной путь, по которому прошёл конвейер
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Degradation {
    /// Параметры не прошли проверку, подставлены значения по умолчанию
    ParameterDefaults { reason: String },
    /// Советник по креплению недоступен, использованы нулевые смещения
    AdvisorUnavailable { reason: String },
    /// Объём сетки около нуля, использована формула
    ClosedFormVolume { measured: f64 },
    /// Компонент пропущен при сборке
    MissingComponent { name: String, reason: String },
    /// Нет ни одной геометрии, подставлен куб-заглушка
    PlaceholderGeometry,
}

/// Метаданные модели
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Unix-время в миллисекундах
    pub created_at: u64,
    pub updated_at: u64,
    pub generated_from: Provenance,
    /// Текст, из которого получена модель (запрос или список компонентов)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_prompt: Option<String>,
    /// Категория одиночного компонента
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ComponentCategory>,
    pub volume: f64,
    pub volume_method: VolumeMethod,
    /// true, если был задействован хотя бы один запасной путь
    #[serde(default)]
    pub degraded: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degradations: Vec<Degradation>,
}

/// Неизменяемая запись модели
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: ModelId,
    pub name: String,
    pub parameters: AeroParameters,
    pub geometry: GeometryRecord,
    pub metadata: ModelMetadata,
}

// ============================================================================
// Запросы и ответы API
// ============================================================================

/// Запрос на генерацию одного компонента
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub parameters: RawParameters,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub generated_from: Provenance,
}

/// Компонент, переданный на сборку
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileComponent {
    pub name: String,
    /// Если не задана, определяется по имени
    #[serde(default)]
    pub category: Option<ComponentCategory>,
    pub geometry: GeometryRecord,
    #[serde(default)]
    pub parameters: RawParameters,
}

/// Запрос на сборку самолёта
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileRequest {
    pub components: Vec<CompileComponent>,
    /// Свободное описание самолёта для советника
    #[serde(default)]
    pub aircraft: Option<serde_json::Value>,
}

fn default_true() -> bool {
    true
}

/// Опции экспорта
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(default = "default_true")]
    pub binary: bool,
    /// Вернуть JSON со сводкой вместо файла
    #[serde(default)]
    pub inspect: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            binary: true,
            inspect: false,
        }
    }
}

/// Запрос на экспорт: по id из хранилища или модель целиком
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub model_id: Option<ModelId>,
    #[serde(default)]
    pub model: Option<ModelRecord>,
    #[serde(default)]
    pub options: ExportOptions,
}

/// Входные данные прочностного расчёта крыла
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Предел текучести, МПа
    pub material_yield: f64,
    /// Плотность материала, кг/м3
    pub material_density: f64,
    /// Высота, м
    pub altitude: f64,
    /// Скорость, м/с
    pub speed: f64,
    pub span: f64,
    pub root_chord: f64,
    /// Толщина, %
    pub thickness: f64,
}

/// Итог расчёта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SimulationStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDetails {
    pub air_density: f64,
    pub dynamic_pressure: f64,
}

/// Результат прочностного расчёта
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub status: SimulationStatus,
    pub safety_factor: f64,
    /// Максимальное напряжение, МПа
    pub max_stress: f64,
    pub lift_force_kn: f64,
    pub details: SimulationDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T>(value: &T)
    where
        T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug,
    {
        let json = serde_json::to_string(value).unwrap();
        let back: T = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, value);
    }

    // --- ComponentCategory ---

    #[test]
    fn test_category_serde_lowercase() {
        let json = serde_json::to_string(&ComponentCategory::Fuselage).unwrap();
        assert_eq!(json, r#""fuselage""#);
        roundtrip(&ComponentCategory::Engine);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Wing".parse::<ComponentCategory>(), Ok(ComponentCategory::Wing));
        assert_eq!(" wings ".parse::<ComponentCategory>(), Ok(ComponentCategory::Wing));
        assert_eq!("ENGINE".parse::<ComponentCategory>(), Ok(ComponentCategory::Engine));
        assert!("tail".parse::<ComponentCategory>().is_err());
    }

    // --- AeroParameters ---

    #[test]
    fn test_parameters_minimal_json_uses_defaults() {
        let json = r#"{ "span": 12.0, "root_chord": 2.0, "thickness": 10.0 }"#;
        let p: AeroParameters = serde_json::from_str(json).unwrap();
        assert_eq!(p.wing_type, "straight");
        assert_eq!(p.tip_chord, None);
        assert_eq!(p.sweep_angle, 0.0);
        assert!(!p.has_vertical_stabilizer);
    }

    #[test]
    fn test_parameters_missing_span_rejected() {
        let json = r#"{ "root_chord": 2.0, "thickness": 10.0 }"#;
        assert!(serde_json::from_str::<AeroParameters>(json).is_err());
    }

    #[test]
    fn test_mean_chord() {
        let mut p = AeroParameters::default();
        p.root_chord = 3.0;
        assert_eq!(p.mean_chord(), 3.0);
        p.tip_chord = Some(1.0);
        assert_eq!(p.mean_chord(), 2.0);
    }

    #[test]
    fn test_dimension_pairs_require_both_nonzero() {
        let mut p = AeroParameters::default();
        p.engine_length = Some(3.0);
        assert_eq!(p.engine_dimensions(), None);
        p.engine_diameter = Some(0.0);
        assert_eq!(p.engine_dimensions(), None);
        p.engine_diameter = Some(1.5);
        assert_eq!(p.engine_dimensions(), Some((3.0, 1.5)));
        assert_eq!(p.fuselage_dimensions(), None);
    }

    // --- Records ---

    #[test]
    fn test_geometry_record_normals_skipped_when_absent() {
        let g = GeometryRecord {
            vertices: vec![0.0, 0.0, 0.0],
            indices: vec![],
            normals: None,
        };
        let json = serde_json::to_string(&g).unwrap();
        assert!(!json.contains("normals"));
        roundtrip(&g);
    }

    #[test]
    fn test_degradation_tagged() {
        let d = Degradation::AdvisorUnavailable {
            reason: "timeout".to_string(),
        };
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains(r#""type":"advisor_unavailable""#));
        roundtrip(&d);
        roundtrip(&Degradation::PlaceholderGeometry);
    }

    #[test]
    fn test_model_record_serde() {
        let record = ModelRecord {
            id: "m1".to_string(),
            name: "Straight Wing".to_string(),
            parameters: AeroParameters::default(),
            geometry: GeometryRecord::default(),
            metadata: ModelMetadata {
                created_at: 1,
                updated_at: 1,
                generated_from: Provenance::Manual,
                source_prompt: None,
                category: Some(ComponentCategory::Wing),
                volume: 0.5,
                volume_method: VolumeMethod::Enclosed,
                degraded: false,
                degradations: vec![],
            },
        };
        roundtrip(&record);
    }

    // --- Requests ---

    #[test]
    fn test_export_request_defaults() {
        let req: ExportRequest = serde_json::from_str(r#"{ "model_id": "abc" }"#).unwrap();
        assert_eq!(req.model_id.as_deref(), Some("abc"));
        assert!(req.options.binary);
        assert!(!req.options.inspect);
    }

    #[test]
    fn test_compile_component_optional_category() {
        let json = r#"{ "name": "Main Wing", "geometry": { "vertices": [], "indices": [] } }"#;
        let c: CompileComponent = serde_json::from_str(json).unwrap();
        assert_eq!(c.category, None);
        assert!(c.parameters.is_empty());
    }

    #[test]
    fn test_simulation_status_uppercase() {
        let json = serde_json::to_string(&SimulationStatus::Pass).unwrap();
        assert_eq!(json, r#""PASS""#);
    }
}
