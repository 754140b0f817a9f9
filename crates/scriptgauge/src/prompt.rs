// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Line-oriented entry of a new metric definition.

use crate::definition::MetricDefinition;
use std::io::{self, BufRead, Write};

/// Asks for the name, description, script and unit of a new gauge.
///
/// Each answer is one line with surrounding whitespace trimmed. Input ending
/// before all four answers are given is an error.
pub fn prompt_definition<R, W>(input: &mut R, output: &mut W) -> io::Result<MetricDefinition>
where
    R: BufRead,
    W: Write,
{
    let name = ask(input, output, "name")?;
    let description = ask(input, output, "description")?;
    let script = ask(input, output, "script name")?;
    let unit = ask(input, output, "unit")?;

    Ok(MetricDefinition::gauge(name, description, script, unit))
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, field: &str) -> io::Result<String> {
    write!(output, "Enter metric {field}: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("input ended before the metric {field} was entered"),
        ));
    }
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn test_prompt_builds_trimmed_gauge() {
        let mut input = Cursor::new("  load \nCPU load\n/opt/checks/load.sh  \npercent\n");
        let mut output = Vec::new();

        let definition = prompt_definition(&mut input, &mut output).unwrap();

        assert_eq!(definition.name, "load");
        assert_eq!(definition.description, "CPU load");
        assert_eq!(definition.kind, "gauge");
        assert_eq!(definition.script_path, PathBuf::from("/opt/checks/load.sh"));
        assert_eq!(definition.unit, "percent");

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Enter metric name: Enter metric description: \
             Enter metric script name: Enter metric unit: "
        );
    }

    #[test]
    fn test_prompt_accepts_last_line_without_newline() {
        let mut input = Cursor::new("load\n\n./load.sh\n%");
        let definition = prompt_definition(&mut input, &mut io::sink()).unwrap();

        assert_eq!(definition.description, "");
        assert_eq!(definition.unit, "%");
    }

    #[test]
    fn test_prompt_fails_on_early_end_of_input() {
        let mut input = Cursor::new("load\nCPU load\n");
        let err = prompt_definition(&mut input, &mut io::sink()).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(err.to_string().contains("script name"));
    }
}
