use rand::{rngs::StdRng, SeedableRng};
use teller::*;

fn get_crate_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?))
}

fn read(p: &str, format: InputFormat) -> Result<Scenario, Box<dyn std::error::Error>> {
    let mut file_path = get_crate_root()?;
    file_path.push(p);
    let scn = read_from_path(file_path, format)?;

    Ok(scn)
}

#[test]
fn json_detect() {
    let scn = read("tests/data/textbook.json", InputFormat::Json).unwrap();
    assert_eq!(scn.mode, Mode::Detect);
    let ev = evaluate(&scn).unwrap();
    assert!(ev.is_safe());
    assert_eq!(ev.safe_sequence(), &[1, 3, 4, 0, 2]);

    let txt = render_text(&ev, ReportOptions::default());
    assert!(txt.contains("Result: System is in a Safe State."));
    assert!(txt.contains("Safe sequence: P1 → P3 → P4 → P0 → P2"));
    assert!(txt.contains("Checking if P0 can proceed"));
    assert!(txt.contains("No process can proceed, ending check"));
}

#[test]
fn text_prevent() {
    let scn = read("tests/data/textbook_request.txt", InputFormat::Text).unwrap();
    assert_eq!(scn.mode, Mode::Prevent { process: 1, request: vec![1, 0, 2] });
    assert_eq!(scn.max[2], vec![9, 0, 2]);
    let ev = evaluate(&scn).unwrap();
    assert!(ev.is_safe());

    let txt = render_text(&ev, ReportOptions { trace: false });
    assert!(txt.contains("Safe State after Request."));
    assert!(txt.contains("Request can be granted safely. Safe Sequence: P1 → P3 → P4 → P0 → P2"));
    assert!(!txt.contains("Steps:"));
}

#[test]
fn text_detect_deadlock() {
    let scn = read("tests/data/crossed.txt", InputFormat::Text).unwrap();
    let ev = evaluate(&scn).unwrap();
    assert!(!ev.is_safe());

    let txt = render_text(&ev, ReportOptions::default());
    assert!(txt.contains("Deadlocked processes: P0, P1"));
    assert!(txt.contains("Completed before halting: P2"));
    assert!(txt.contains("P0 -> P2"));
    assert!(txt.contains("P2 -> -"));
}

#[test]
fn validation_error_reaches_json() {
    let scn = read("tests/data/over_max.json", InputFormat::Json).unwrap();
    let res = evaluate(&scn);
    assert!(res.is_err());
    let out: serde_json::Value = serde_json::from_str(&render_json(&res).unwrap()).unwrap();
    assert_eq!(out["error"]["kind"], "allocation_exceeds_max");
    assert_eq!(out["error"]["process"], 1);
    assert_eq!(out["error"]["resource"], 0);
    assert_eq!(out["error"]["allocated"], 2);
    assert_eq!(out["error"]["max"], 1);
}

#[test]
fn request_length_mismatch() {
    let scn = read("tests/data/bad_length.txt", InputFormat::Text).unwrap();
    let res = evaluate(&scn);
    assert!(matches!(
        res,
        Err(BankError::Request(bankcore::RequestError::LengthMismatch { expected: 2, found: 1 }))
    ));
}

#[test]
fn negative_numbers_are_rejected() {
    let res = read("tests/data/negative.txt", InputFormat::Text);
    let msg = res.unwrap_err().to_string();
    assert!(msg.contains("Line 3"));
    assert!(msg.contains("'-1' is not a non-negative integer"));
}

#[test]
fn form_parsing_errors() {
    let missing = parse_form("processes 1\nresources 1\nmax\n1\nallocation\n0\n".as_bytes());
    assert!(matches!(missing, Err(IngestError::Missing("available"))));

    let early = parse_form("max\n1\n".as_bytes());
    assert!(matches!(early, Err(IngestError::Parse { line: 1, .. })));

    let short = parse_form("processes 2\nmax\n1\n".as_bytes());
    assert!(matches!(short, Err(IngestError::Parse { line: 2, .. })));

    let no_request = parse_form(
        "processes 1\nresources 1\navailable 1\nmax\n1\nallocation\n0\nmode prevent\nrequest_process 0\n".as_bytes()
    );
    assert!(matches!(no_request, Err(IngestError::Missing("request"))));

    let unknown = parse_form("proceses 1\n".as_bytes());
    assert!(matches!(unknown, Err(IngestError::Parse { line: 1, .. })));
}

#[test]
fn generated_scenarios_validate() {
    let mut rng = StdRng::seed_from_u64(42);
    for request in [false, true] {
        for _ in 0..50 {
            let cfg = GenConfig {
                processes:  4,
                resources:  3,
                max_units:  6,
                request,
            };
            let scn = generate(&cfg, &mut rng);
            let ev = evaluate(&scn).unwrap();
            // Generated requests always fit, so the only possible denial
            // is an unsafe trial state.
            if let Outcome::Prevent(bankcore::RequestVerdict::Denied { reason }) = &ev.outcome {
                assert!(matches!(reason, bankcore::Denial::Unsafe { .. }));
            }
        }
    }
}

#[test]
fn generated_scenario_round_trip() {
    let mut rng = StdRng::seed_from_u64(7);
    let cfg = GenConfig {
        processes:  3,
        resources:  2,
        max_units:  5,
        request:    true,
    };
    let scn = generate(&cfg, &mut rng);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.json");
    write_scenario(BufWriter::new(File::create(&path).unwrap()), &scn).unwrap();
    let back = read_from_path(path, InputFormat::Json).unwrap();
    assert_eq!(back, scn);
}

#[test]
fn command_line_mode_overrides() {
    let prevent = Mode::Prevent { process: 1, request: vec![1, 0, 2] };

    // A bare request turns a detect scenario into prevent mode, and
    // then the process has to come from somewhere.
    assert_eq!(
        resolve_mode(&Mode::Detect, None, None, Some(vec![1, 0, 2])),
        Err(OverrideError::MissingProcess)
    );
    assert_eq!(
        resolve_mode(&Mode::Detect, None, Some(1), Some(vec![1, 0, 2])),
        Ok(prevent.clone())
    );
    assert_eq!(
        resolve_mode(&Mode::Detect, Some(ModeArg::Detect), None, Some(vec![1])),
        Err(OverrideError::RequestInDetectMode)
    );
    assert_eq!(
        resolve_mode(&Mode::Detect, Some(ModeArg::Prevent), Some(0), None),
        Err(OverrideError::MissingRequest)
    );

    // Command-line parts win over the file's.
    assert_eq!(
        resolve_mode(&prevent, None, Some(3), None),
        Ok(Mode::Prevent { process: 3, request: vec![1, 0, 2] })
    );
    assert_eq!(resolve_mode(&prevent, Some(ModeArg::Detect), None, None), Ok(Mode::Detect));
    assert_eq!(resolve_mode(&Mode::Detect, None, None, None), Ok(Mode::Detect));
}
