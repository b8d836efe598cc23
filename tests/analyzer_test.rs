use bpscan::config::{AnalyzerConfig, DEFAULT_MAX_FILE_SIZE, load_config_from_yaml};
use bpscan::document::builder::{ProcessBuilder, ReleaseBuilder, element_node};
use bpscan::document::writer::to_xml_string;
use bpscan::extract::PatternSpec;
use bpscan::model::Analysis;
use bpscan::service::AnalysisService;
use bpscan::storage::{AnalysisStore, InMemoryAnalysisStore};
use bpscan::{AnalysisError, Analyzer, FileKind};
use std::fs;
use std::sync::Arc;

fn process_xml() -> String {
    let process = ProcessBuilder::new("Daily Report")
        .attr("bpversion", "6.10.1")
        .subsheet("s1", "Build Report")
        .stage("start", "Start", "Start").build()
        .stage("x1", "Excel - Open Workbook", "Action").subsheet("s1").build()
        .call("x2", Some("s1"), "Utility - Date and Time", "Get Current Date")
        .stage("d1", "Is Weekend?", "Decision").build()
        .build();
    to_xml_string(&process).expect("render failed")
}

fn object_xml() -> String {
    let object = ProcessBuilder::object("Web Portal VBO")
        .narrative("Drives the supplier portal")
        .stage("i1", "Login", "SubSheetInfo").input("Username", "text", "").build()
        .call("c1", None, "Utility - Environment", "Get User Name")
        .element(element_node("e1", "Portal", "Application"))
        .build();
    to_xml_string(&object).expect("render failed")
}

fn service() -> (AnalysisService, Arc<InMemoryAnalysisStore>) {
    let store = Arc::new(InMemoryAnalysisStore::new());
    let service = AnalysisService::new(AnalyzerConfig::default(), store.clone()).expect("service");
    (service, store)
}

#[test]
fn test_file_kind_from_extension() {
    assert_eq!(FileKind::from_file_name("a.bpprocess"), Ok(FileKind::Process));
    assert_eq!(FileKind::from_file_name("dir/B.BPOBJECT"), Ok(FileKind::Object));
    assert_eq!(FileKind::from_file_name("r.bprelease"), Ok(FileKind::Release));
    assert_eq!(FileKind::from_extension(".BPProcess"), Ok(FileKind::Process));
    assert!(matches!(
        FileKind::from_file_name("notes.txt"),
        Err(AnalysisError::UnsupportedExtension(_))
    ));
}

#[test]
fn test_process_analysis() {
    let xml = process_xml();
    let analysis = Analyzer::default()
        .analyze_bytes("daily.bpprocess", xml.as_bytes())
        .expect("analysis failed");

    let Analysis::Process(process) = analysis else {
        panic!("expected a process analysis");
    };
    assert_eq!(process.name, "Daily Report");
    assert_eq!(process.file_size, xml.len() as u64);
    assert_eq!(process.version, "1.0");
    assert_eq!(process.bp_version.as_deref(), Some("6.10.1"));
    assert_eq!(process.stage_count, 4);
    assert_eq!(process.subsheet_count, 1);
    assert_eq!(process.subsheets[0].stage_count, 2);
    assert_eq!(process.stage_types.get("Action"), Some(&2));
    assert_eq!(process.stage_types.get("Decision"), Some(&1));
    assert_eq!(process.total_vbo_count, 2);
    assert_eq!(process.total_action_count, 2);
    assert_eq!(process.total_usage_count, 2);
}

#[test]
fn test_object_analysis() {
    let xml = object_xml();
    let analysis = Analyzer::default()
        .analyze_bytes("portal.bpobject", xml.as_bytes())
        .expect("analysis failed");

    let Analysis::Vbo(vbo) = analysis else {
        panic!("expected a VBO analysis");
    };
    assert_eq!(vbo.name, "Web Portal VBO");
    assert_eq!(vbo.description, "Drives the supplier portal");
    assert_eq!(vbo.run_mode.as_deref(), Some("Exclusive"));
    assert_eq!(vbo.action_count, 1);
    assert_eq!(vbo.element_count, 1);
    assert_eq!(vbo.dependencies.len(), 1);
    assert_eq!(vbo.dependencies[0].name, "Utility - Environment");
}

#[test]
fn test_release_analysis_dispatch() {
    let release = ReleaseBuilder::new("R1")
        .process("p1", ProcessBuilder::new("P1").build())
        .build();
    let xml = to_xml_string(&release).unwrap();

    let analysis = Analyzer::default()
        .analyze_bytes("r1.bprelease", xml.as_bytes())
        .expect("analysis failed");
    assert!(matches!(analysis, Analysis::Release(ref r) if r.total_process_count == 1));
}

#[test]
fn test_malformed_xml_is_terminal() {
    let result = Analyzer::default().analyze_bytes("broken.bpprocess", br#"<process name="x">"#);
    assert!(matches!(result, Err(AnalysisError::MalformedXml(_))));

    let result = Analyzer::default().analyze_bytes("binary.bpprocess", &[0x3c, 0xff, 0xfe, 0x3e]);
    assert!(matches!(result, Err(AnalysisError::MalformedXml(_))));
}

#[test]
fn test_wrong_root_is_unrecognized_format() {
    let result = Analyzer::default().analyze_bytes("odd.bpprocess", b"<workflow/>");
    assert_eq!(
        result,
        Err(AnalysisError::UnrecognizedFormat {
            expected: "process",
            found: "workflow".to_string(),
        })
    );

    // A process document is not a release
    let result = Analyzer::default().analyze_bytes("odd.bprelease", process_xml().as_bytes());
    assert!(matches!(result, Err(AnalysisError::UnrecognizedFormat { expected: "bpr:release", .. })));
}

#[test]
fn test_missing_header_fields_use_defaults() {
    let analysis = Analyzer::default()
        .analyze_bytes("bare.bpprocess", b"<process/>")
        .expect("analysis failed");
    let Analysis::Process(process) = analysis else { panic!() };
    assert_eq!(process.name, "Unknown Process");
    assert_eq!(process.version, "1.0");
    assert_eq!(process.description, "");
    assert!(process.dependencies.is_empty());

    let analysis = Analyzer::default()
        .analyze_bytes("bare.bpobject", b"<process type=\"object\"/>")
        .expect("analysis failed");
    assert_eq!(analysis.name(), "Unknown VBO");
}

#[test]
fn test_analysis_json_shape() {
    let analysis = Analyzer::default()
        .analyze_bytes("daily.bpprocess", process_xml().as_bytes())
        .unwrap();
    let json = serde_json::to_value(&analysis).unwrap();

    assert_eq!(json["kind"], "process");
    assert_eq!(json["fileName"], "daily.bpprocess");
    assert_eq!(json["dependencies"][0]["name"], "MS Excel VBO");
    assert_eq!(json["dependencies"][0]["usageCount"], 1);
    assert_eq!(json["dependencies"][0]["locations"][0], "Build Report");

    let back: Analysis = serde_json::from_value(json).expect("round trip");
    assert_eq!(back, analysis);
}

#[test]
fn test_upload_limits() {
    let (service, _) = service();

    assert!(service.check_upload("a.bpprocess", 10).is_ok());
    assert!(service.check_upload("A.BPRELEASE", 10).is_ok());
    assert_eq!(
        service.check_upload("a.xml", 10),
        Err(AnalysisError::UnsupportedExtension("xml".to_string()))
    );
    assert_eq!(
        service.check_upload("a.bpobject", DEFAULT_MAX_FILE_SIZE + 1),
        Err(AnalysisError::FileTooLarge {
            size: DEFAULT_MAX_FILE_SIZE + 1,
            limit: DEFAULT_MAX_FILE_SIZE,
        })
    );
}

#[tokio::test]
async fn test_ingest_file_stores_record() {
    let (service, store) = service();

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("daily.bpprocess");
    fs::write(&path, process_xml()).expect("Failed to write temp file");

    let record = service.ingest_file(&path).await.expect("ingest failed");
    assert_eq!(record.analysis.file_name(), "daily.bpprocess");
    assert_eq!(store.len(), 1);

    let fetched = service.fetch(record.id).await.unwrap().expect("record missing");
    assert_eq!(fetched, record);

    assert_eq!(store.list_ids().await.unwrap(), vec![record.id]);
    assert!(store.delete(record.id).await.unwrap());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_rejected_upload_is_not_stored() {
    let (service, store) = service();

    let result = service.ingest_bytes("bad.bpprocess", b"<process>").await;
    let err = result.expect_err("malformed input must fail");
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::MalformedXml(_))
    ));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_concurrent_analyses_are_independent() {
    let (service, store) = service();
    let service = Arc::new(service);

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let xml = if i % 2 == 0 { process_xml() } else { object_xml() };
            let name = if i % 2 == 0 { "p.bpprocess" } else { "o.bpobject" };
            service.ingest_bytes(name, xml.as_bytes()).await
        }));
    }

    let mut analyses = Vec::new();
    for handle in handles {
        analyses.push(handle.await.unwrap().expect("ingest failed").analysis);
    }

    assert_eq!(store.len(), 8);
    assert!(analyses.iter().step_by(2).all(|a| a == &analyses[0]));
    assert!(analyses.iter().skip(1).step_by(2).all(|a| a == &analyses[1]));
}

#[test]
fn test_load_config_from_yaml() {
    let yaml_content = r#"
max_file_size: 1024
allowed_extensions: ["bpprocess"]
extra_patterns:
  - pattern: "(?i)salesforce"
    vbo: "Salesforce VBO"
"#;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("bpscan.yaml");
    fs::write(&file_path, yaml_content).expect("Failed to write temp file");

    let config = load_config_from_yaml(&file_path.to_string_lossy()).expect("Failed to load config");

    assert_eq!(config.max_file_size, 1024);
    assert_eq!(config.allowed_extensions, vec!["bpprocess".to_string()]);
    assert_eq!(config.extra_patterns[0].vbo, "Salesforce VBO");
    // Unset keys keep their defaults
    assert_eq!(config.redis_key_prefix, AnalyzerConfig::default().redis_key_prefix);

    let service = AnalysisService::new(config, Arc::new(InMemoryAnalysisStore::new())).unwrap();
    assert!(matches!(
        service.check_upload("a.bpobject", 1),
        Err(AnalysisError::UnsupportedExtension(_))
    ));
    let process = to_xml_string(
        &ProcessBuilder::new("CRM").stage("s", "Salesforce Sync", "Action").build().build(),
    )
    .unwrap();
    let analysis = service.analyze_upload("crm.bpprocess", process.as_bytes()).unwrap();
    let Analysis::Process(process) = analysis else { panic!() };
    assert_eq!(process.dependencies[0].name, "Salesforce VBO");
}

#[test]
fn test_extra_patterns_reach_the_service_analyzer() {
    let config = AnalyzerConfig {
        extra_patterns: vec![PatternSpec {
            pattern: "(?i)sharepoint".to_string(),
            vbo: "SharePoint VBO".to_string(),
            description: None,
        }],
        ..AnalyzerConfig::default()
    };
    let service = AnalysisService::new(config, Arc::new(InMemoryAnalysisStore::new())).unwrap();

    let builtin = Analyzer::default().patterns().rules().len();
    let rules = service.analyzer().patterns().rules();
    assert_eq!(rules.len(), builtin + 1);
    assert_eq!(rules[builtin].vbo_name, "SharePoint VBO");
    assert!(rules[builtin].is_match("Upload to SharePoint"));
}

#[test]
fn test_unknown_allowed_extension_is_rejected() {
    let config = AnalyzerConfig {
        allowed_extensions: vec!["bpprocess".to_string(), "xml".to_string()],
        ..AnalyzerConfig::default()
    };
    let result = AnalysisService::new(config, Arc::new(InMemoryAnalysisStore::new()));
    assert!(matches!(result, Err(AnalysisError::UnsupportedExtension(ref e)) if e == "xml"));

    let config = AnalyzerConfig {
        allowed_extensions: vec![".BPObject".to_string()],
        ..AnalyzerConfig::default()
    };
    let service = AnalysisService::new(config, Arc::new(InMemoryAnalysisStore::new())).unwrap();
    assert!(service.check_upload("a.bpobject", 1).is_ok());
    assert!(service.check_upload("a.bpprocess", 1).is_err());
}

#[test]
fn test_repeated_subsheet_ids_are_summarised_once() {
    let process = ProcessBuilder::new("Dupes")
        .subsheet("s1", "First")
        .subsheet("s1", "Again")
        .subsheet("s2", "Second")
        .stage("a", "A", "Calculation").subsheet("s1").build()
        .build();
    let xml = to_xml_string(&process).unwrap();

    let analysis = Analyzer::default().analyze_bytes("dupes.bpprocess", xml.as_bytes()).unwrap();
    let Analysis::Process(process) = analysis else { panic!() };

    let names: Vec<_> = process.subsheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);
    assert_eq!(process.subsheet_count, 2);
    assert_eq!(process.subsheets[0].stage_count, 1);
}
