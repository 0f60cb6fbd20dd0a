//! Test fixture generators
//!
//! TypeScript sources for end-to-end tests, plus generators for
//! property tests and benchmarks.

use codegraph_ssa::{build_from_source, BuildConfig, SsaUnit};

/// Parse and lower `source` with the default configuration
pub fn build_source(source: &str) -> SsaUnit {
    build_source_with(source, &BuildConfig::default())
}

pub fn build_source_with(source: &str, config: &BuildConfig) -> SsaUnit {
    match build_from_source(source, config) {
        Ok(unit) => unit,
        Err(e) => panic!("failed to build fixture: {}", e),
    }
}

/// Class hierarchy with a forward parent reference, an interface and an enum
pub const SHAPES_TS: &str = r#"
export class Square extends Rect {
    constructor(public side: number) {
        super(side, side);
    }
    describe(): string {
        return "square";
    }
}

export class Rect implements Shape {
    width: number = 0;
    height: number = 0;
    constructor(w: number, h: number) {
        this.width = w;
        this.height = h;
    }
    area() {
        return this.width * this.height;
    }
}

export interface Shape {
    area(): number;
    name?: string;
}

export enum Kind {
    Square,
    Rect = 10,
    Circle,
}

export const unit = new Square(2);
export const size = unit.area();
"#;

/// Scalar flow through branches, loops and calls
pub const FLOW_TS: &str = r#"
let total = 0;
for (let i = 0; i < 10; i++) {
    if (i % 2 === 0) {
        total = total + i;
    } else {
        continue;
    }
}

function bump(n: number) {
    total = total + n;
    return total;
}

bump(5);
export { total };
export default bump;
"#;

/// Class `C{i}` extends `C{i-1}`; `C{i}` declares method `m{i}`
pub fn fixture_class_chain(length: usize) -> String {
    let mut src = String::from("class C0 { m0() { return 0; } }\n");
    for i in 1..length {
        src.push_str(&format!("class C{i} extends C{} {{ m{i}() {{ return {i}; }} }}\n", i - 1));
    }
    src
}

/// YAML v1 configuration text
pub fn fixture_yaml_config(preset: &str, max_depth: usize) -> String {
    format!(
        "version: 1\npreset: {preset}\noverrides:\n  max_inheritance_depth: {max_depth}\n  max_errors: 5\n"
    )
}
