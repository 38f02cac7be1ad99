// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fixed leading text of every generated compilation unit.

/// Compiler directives. The nullable context is enabled so that the
/// generated code compiles unchanged in annotated projects, and the
/// obsolescence and type conflict warnings are silenced for element
/// types outside our control.
pub const DIRECTIVES: &str = "#nullable enable
#pragma warning disable CS0612,CS0618
#pragma warning disable CS0436
";

/// Namespace imports required by the generated members.
pub const USINGS: &str = "using System;
using System.Runtime.InteropServices;
using System.Diagnostics.CodeAnalysis;
using System.Diagnostics;
";
