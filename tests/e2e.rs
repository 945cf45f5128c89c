//! End-to-end interpreter scenarios.

use safulate::span::Source;
use safulate::value::Value;
use safulate::{parser, Interpreter, InterpreterConfig, ModuleLoadError, ModuleLoader, Version};

struct NoModules;

impl ModuleLoader for NoModules {
	fn load(&mut self, name_or_url: &str) -> Result<safulate::ast::Program, ModuleLoadError> {
		Err(ModuleLoadError::NotFound(name_or_url.to_string()))
	}
}

fn fresh_interp() -> Interpreter {
	Interpreter::new(Box::new(NoModules), Version::new(0, 1, 0), InterpreterConfig::default())
}

fn run(src: &str) -> Value {
	let source = Source::synthetic(src.to_string());
	let program = parser::parse(&source).unwrap_or_else(|e| panic!("parse error: {e}\nsource:\n{src}"));
	let mut interp = fresh_interp();
	interp.run(&program).unwrap_or_else(|e| panic!("runtime error: {e}\nsource:\n{src}"))
}

/// Like [`run`], but expects (and unwraps) a `String` result — `print`
/// writes straight to stdout, so these scenarios build their output in a
/// local string and return it instead of capturing the process's stdout.
fn run_captured(src: &str) -> String {
	match run(src) {
		Value::String(s) => s.to_string(),
		other => panic!("expected string result, got {other}\nsource:\n{src}"),
	}
}

#[test]
fn scope_shadow() {
	// Adapted to return the two values instead of asserting on captured stdout.
	let v = run(
		r#"
		var x = 5;
		var inner = 0;
		{ var x = 10; inner = x; }
		f"{inner}-{x}";
		"#,
	);
	assert_eq!(v.to_string(), "10-5");
}

#[test]
fn plain_assignment_mutates_outer_binding() {
	let v = run(
		r#"
		var x = 1;
		{ x = 2; }
		x;
		"#,
	);
	assert_eq!(v.to_string(), "2");
}

#[test]
fn plain_assignment_without_prior_declaration_is_name_error() {
	let source = Source::synthetic("y = 1;".to_string());
	let program = parser::parse(&source).unwrap();
	let mut interp = fresh_interp();
	let err = interp.run(&program).unwrap_err();
	assert!(matches!(err, safulate::SafulateError::Name(_, _)));
}

#[test]
fn labeled_break_exits_three_nested_loops() {
	let v = run(
		r#"
		var hits = 0;
		while 1 {
			hits = hits + 1;
			while 1 {
				hits = hits + 1;
				while 1 {
					hits = hits + 1;
					break 3;
				}
			}
		}
		hits;
		"#,
	);
	assert_eq!(v.to_string(), "3");
}

#[test]
fn switch_fallthrough_via_continue() {
	let out = run_captured(
		r#"
		var out = "";
		switch "best" {
			case "best" { out = out + "a"; continue 2; }
			case "test" { out = out + "b"; }
			case "foo" { out = out + "c"; }
		}
		out;
		"#,
	);
	assert_eq!(out, "ac");
}

#[test]
fn switch_no_match_is_a_no_op() {
	let out = run_captured(
		r#"
		var out = "none";
		switch "missing" {
			case "a" { out = "a"; }
		}
		out;
		"#,
	);
	assert_eq!(out, "none");
}

#[test]
fn spec_dispatch_on_custom_add() {
	let v = run(
		r#"
		var x = object();
		x ~ {
			spec add(o) { return 5; }
		}
		x + "test";
		"#,
	);
	assert!(matches!(v, Value::Number(n) if n == 5.0));
}

#[test]
fn partial_application_matches_equivalent_direct_call() {
	let v = run(
		r#"
		func test(a, b, c, d, e) {
			return a + b + c + d + e;
		}
		var viaSpread = test(1, ..[2, 3, 4], 5);
		var viaPartial = test[1, 2](3, 4, 5);
		f"{viaSpread}-{viaPartial}";
		"#,
	);
	assert_eq!(v.to_string(), "15-15");
}

#[test]
fn property_decorator_backs_a_mutable_field() {
	let v = run(
		r#"
		struct Counter() {
			priv count = 0;
			func val() [property] { return count; }
			func inc() { count = count + 1; }
		}
		var c = Counter();
		var before = c.val;
		c.inc();
		var after = c.val;
		f"{before}-{after}";
		"#,
	);
	assert_eq!(v.to_string(), "0-1");
}

#[test]
fn try_catch_else_runs_else_only_on_success() {
	let v = run(
		r#"
		var log = "";
		try {
			log = log + "A";
		} catch e {
			log = log + "C";
		} else {
			log = log + "E";
		}
		try {
			raise "boom";
		} catch e {
			log = log + "-" + e;
		} else {
			log = log + "E2";
		}
		log;
		"#,
	);
	assert_eq!(v.to_string(), "AE-boom");
}

#[test]
fn type_desugaring_builds_constructable_struct_like_value() {
	let v = run(
		r#"
		type Point {
			pub origin = "0,0";
		} -> (x, y) {
			func sum() { return x + y; }
		}
		var p = Point(3, 4);
		p.sum();
		"#,
	);
	assert!(matches!(v, Value::Number(n) if n == 7.0));
}

#[test]
fn req_version_constraint_failure_raises_version_error() {
	let source = Source::synthetic("req +v9;".to_string());
	let program = parser::parse(&source).unwrap();
	let mut interp = fresh_interp();
	let err = interp.run(&program).unwrap_err();
	assert!(matches!(err, safulate::SafulateError::Version(_, _)));
}

#[test]
fn decorator_chain_with_non_function_result_binds_verbatim() {
	// A decorator returning `5` makes the decorated name equal to `5`.
	let v = run(
		r#"
		func five(f) { return 5; }
		func constFive() [five] {
			return 0;
		}
		constFive;
		"#,
	);
	assert!(matches!(v, Value::Number(n) if n == 5.0));
}

#[test]
fn stack_overflow_on_unbounded_recursion() {
	let source = Source::synthetic(
		r#"
		func loop() { return loop(); }
		loop();
		"#
		.to_string(),
	);
	let program = parser::parse(&source).unwrap();
	let mut interp = Interpreter::new(Box::new(NoModules), Version::new(0, 1, 0), InterpreterConfig { max_depth: 64, ..InterpreterConfig::default() });
	let err = interp.run(&program).unwrap_err();
	assert!(matches!(err, safulate::SafulateError::StackOverflow(_)));
}
